//! Data models for the TikTok Research API.
//!
//! - [`primitives`] - Identifiers and the validated [`DateRange`]
//! - [`query`] - The boolean filter sent with video queries
//! - [`video`], [`comment`], [`user`] - Typed projections of returned records
//!
//! Record types are thin: the remote schema belongs to TikTok, so every
//! field the API may omit is optional. Any `DeserializeOwned` type,
//! `serde_json::Value` included, can be used in their place.

pub mod primitives;
pub mod query;
pub mod video;
pub mod comment;
pub mod user;

pub use primitives::*;
pub use query::*;
pub use video::*;
pub use comment::*;
pub use user::*;
