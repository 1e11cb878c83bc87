//! HTTP client and paging layer for the TikTok Research API.
//!
//! This module provides the main entry point [`ResearchClient`], its
//! [`ClientConfig`], and the [`PaginatedStream`] every list endpoint returns.
//!
//! # Example
//!
//! ```no_run
//! use tiktok_research::{ClientConfig, ResearchClient, Username};
//!
//! # async fn example() -> tiktok_research::Result<()> {
//! let client = ResearchClient::authenticate_with_config(
//!     "client-key",
//!     "client-secret",
//!     ClientConfig::default().with_page_size(50),
//! ).await?;
//!
//! let profile = client.users().info(&Username::new("tiktok")).await?;
//! println!("{:?} followers", profile.follower_count);
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
pub mod paginated;

pub use config::{ClientConfig, DEFAULT_AUTH_PATH, DEFAULT_BASE_URL, MAX_PAGE_SIZE};
pub use http::ResearchClient;
pub use paginated::{Cursor, Page, PaginatedStream, PaginationState};
pub(crate) use http::{build_http_client, ClientInner};
