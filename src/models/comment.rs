//! Comment records returned by `/video/comment/list/`.

use serde::{Deserialize, Serialize};

use super::primitives::VideoId;

/// Fields requested from the comment endpoint unless overridden.
pub const COMMENT_FIELDS: &[&str] = &[
    "id",
    "video_id",
    "text",
    "like_count",
    "reply_count",
    "parent_comment_id",
    "create_time",
];

/// A comment on a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment ID
    pub id: i64,
    /// Video the comment is under
    #[serde(default)]
    pub video_id: Option<VideoId>,
    /// Comment text
    #[serde(default)]
    pub text: Option<String>,
    /// Number of likes
    #[serde(default)]
    pub like_count: Option<i64>,
    /// Number of replies
    #[serde(default)]
    pub reply_count: Option<i64>,
    /// Parent comment; equal to the video ID for top-level comments
    #[serde(default)]
    pub parent_comment_id: Option<i64>,
    /// Creation time as a Unix timestamp
    #[serde(default)]
    pub create_time: Option<i64>,
}

impl Comment {
    /// Returns `true` if this comment replies to another comment rather than
    /// the video itself.
    pub fn is_reply(&self) -> bool {
        match (self.parent_comment_id, self.video_id) {
            (Some(parent), Some(video)) => parent != video.get(),
            _ => false,
        }
    }
}
