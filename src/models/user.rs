//! User profile and follower records.

use serde::{Deserialize, Serialize};

/// Fields requested from `/user/info/` unless overridden.
pub const USER_INFO_FIELDS: &[&str] = &[
    "display_name",
    "bio_description",
    "avatar_url",
    "is_verified",
    "follower_count",
    "following_count",
    "likes_count",
    "video_count",
];

/// Public profile information for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Display name (nickname)
    #[serde(default)]
    pub display_name: Option<String>,
    /// Bio text
    #[serde(default)]
    pub bio_description: Option<String>,
    /// Profile picture URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Verified badge
    #[serde(default)]
    pub is_verified: Option<bool>,
    /// Number of accounts the user follows
    #[serde(default)]
    pub following_count: Option<i64>,
    /// Number of followers
    #[serde(default)]
    pub follower_count: Option<i64>,
    /// Number of posted videos
    #[serde(default)]
    pub video_count: Option<i64>,
    /// Total likes received
    #[serde(default)]
    pub likes_count: Option<i64>,
}

/// An entry in a follower or following list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFollower {
    /// Profile name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Username
    pub username: String,
}
