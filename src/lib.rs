//! # tiktok-research
//!
//! An async Rust client for the TikTok Research API.
//!
//! The crate covers the two pieces of the API with any moving parts:
//!
//! - **Authentication**: exchanging a client key and secret for a
//!   short-lived [`BearerToken`]
//! - **Pagination**: turning a query plus a date range into a lazy
//!   [`PaginatedStream`] that follows the server's cursor page by page,
//!   stopping at the end of the results or at a caller-chosen maximum
//!
//! Everything else (videos, comments, user profiles, followers, liked,
//! reposted and pinned videos) is thin marshalling on top of those two.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use futures_util::StreamExt;
//! use tiktok_research::ResearchClient;
//! use tiktok_research::models::{Condition, Query, QueryField};
//!
//! #[tokio::main]
//! async fn main() -> tiktok_research::Result<()> {
//!     let client = ResearchClient::authenticate("client-key", "client-secret").await?;
//!
//!     let query = Query::builder()
//!         .and(Condition::is_in(QueryField::RegionCode, ["JP", "US"]))
//!         .and(Condition::eq(QueryField::Keyword, "animal"))
//!         .build()?;
//!
//!     let mut videos = client.videos().start_query(
//!         query,
//!         NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
//!         Some(1000),
//!     )?;
//!
//!     while let Some(video) = videos.next().await {
//!         let video = video?;
//!         println!("{}: {:?}", video.id, video.video_description);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Nothing is retried. A failed page fetch is yielded by the stream as
//! [`Error::Request`] (with the page number) or [`Error::RateLimited`], and
//! the stream ends there. Inputs are validated before any request is made;
//! an expired token fails with [`Error::TokenExpired`] instead of being sent.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export primary types at crate root for convenience
pub use error::{Error, Result};
pub use models::{DateRange, Username, VideoId};
pub use client::{ClientConfig, PaginatedStream, ResearchClient};
pub use auth::{BearerToken, TokenProvider};
pub use api::{start_query, VideoQueryRequest};

/// Prelude module for convenient imports.
///
/// ```rust
/// use tiktok_research::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        DateRange, Username, VideoId,
        // Query
        Condition, Operation, Query, QueryBuilder, QueryField,
        // Records
        Comment, UserFollower, UserInfo, Video,
    };
    pub use crate::client::{ClientConfig, Cursor, PaginatedStream, ResearchClient};
    pub use crate::auth::{BearerToken, TokenProvider};
    pub use crate::api::{start_query, VideoQueryRequest};
}
