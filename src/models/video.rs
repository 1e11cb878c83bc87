//! Video records returned by the query and user video endpoints.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::primitives::VideoId;

/// Fields requested from `/video/query/` unless overridden.
pub const VIDEO_FIELDS: &[&str] = &[
    "id",
    "video_description",
    "create_time",
    "region_code",
    "share_count",
    "view_count",
    "like_count",
    "comment_count",
    "music_id",
    "hashtag_names",
    "username",
    "effect_ids",
    "playlist_id",
    "voice_to_text",
    "is_stem_verified",
    "favorites_count",
    "video_duration",
];

/// Fields requested from the per-user video endpoints unless overridden.
pub const USER_VIDEO_FIELDS: &[&str] = &[
    "id",
    "create_time",
    "username",
    "region_code",
    "video_description",
    "music_id",
    "like_count",
    "comment_count",
    "share_count",
    "view_count",
    "hashtag_names",
    "is_stem_verified",
    "video_duration",
];

/// A TikTok video as seen by the Research API.
///
/// Only `id` is guaranteed; everything else depends on the requested fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Unique video ID
    pub id: VideoId,
    /// Posting time as a Unix timestamp (seconds, UTC)
    #[serde(default)]
    pub create_time: Option<i64>,
    /// Author's username
    #[serde(default)]
    pub username: Option<String>,
    /// Country code of the author's registration
    #[serde(default)]
    pub region_code: Option<String>,
    /// Video description (title)
    #[serde(default)]
    pub video_description: Option<String>,
    /// Music used in the video
    #[serde(default)]
    pub music_id: Option<i64>,
    /// Number of likes
    #[serde(default)]
    pub like_count: Option<i64>,
    /// Number of comments
    #[serde(default)]
    pub comment_count: Option<i64>,
    /// Number of shares
    #[serde(default)]
    pub share_count: Option<i64>,
    /// Number of views
    #[serde(default)]
    pub view_count: Option<i64>,
    /// Number of times the video was added to favorites
    #[serde(default)]
    pub favorites_count: Option<i64>,
    /// Effects applied to the video
    #[serde(default)]
    pub effect_ids: Option<Vec<String>>,
    /// Hashtags the video participates in
    #[serde(default)]
    pub hashtag_names: Vec<String>,
    /// Playlist the video belongs to
    #[serde(default)]
    pub playlist_id: Option<i64>,
    /// Generated voice-to-text transcript
    #[serde(default)]
    pub voice_to_text: Option<String>,
    /// Whether the video is STEM verified
    #[serde(default)]
    pub is_stem_verified: Option<bool>,
    /// Duration in seconds
    #[serde(default)]
    pub video_duration: Option<i64>,
}

impl Video {
    /// Posting time as a UTC timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.create_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }
}
