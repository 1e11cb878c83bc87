//! API service modules for Research API endpoints.
//!
//! Each service provides methods for interacting with a specific
//! subset of the Research API.

mod users;
mod videos;

pub use users::UsersService;
pub use videos::{start_query, VideoQueryRequest, VideosService};
