//! Error types for the TikTok Research API client.
//!
//! Every failure surfaces through a single [`Error`] enum. Nothing in this
//! crate retries or swallows an error: a failed page fetch ends the stream it
//! belongs to and is handed to the caller as-is.

use serde_json::Value;
use thiserror::Error;

/// A specialized `Result` type for Research API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all Research API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP client could not be constructed or a request failed outside of
    /// a page fetch
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential exchange was rejected, the auth endpoint was unreachable,
    /// or the API refused the bearer token (HTTP 401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The bearer token passed its expiry before a request could be sent
    #[error("Bearer token expired; obtain a new token")]
    TokenExpired,

    /// Transport or HTTP-level failure while fetching a page
    #[error("Request failed on page {page}: {message}")]
    Request {
        /// 1-based page attempt the failure occurred on
        page: u32,
        /// HTTP status code, if a response was received
        status: Option<u16>,
        /// Error code from the API error envelope
        code: Option<String>,
        /// Human-readable error message
        message: String,
        /// Server-side log identifier, useful when reporting issues
        log_id: Option<String>,
    },

    /// Rate limited by the API (HTTP 429)
    #[error("Rate limited on page {page}; retry after {retry_after_secs} seconds")]
    RateLimited {
        /// 1-based page attempt that was rejected
        page: u32,
        /// Number of seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// The API answered with a payload of an unexpected shape
    #[error("Unexpected response format: {0}")]
    ResponseFormat(String),

    /// Invalid input provided to a function, detected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if this error is potentially transient and the whole
    /// iteration could be retried by the caller.
    ///
    /// # Example
    ///
    /// ```
    /// use tiktok_research::Error;
    ///
    /// fn handle_error(err: Error) {
    ///     if err.is_retryable() {
    ///         println!("Starting the query again...");
    ///     }
    /// }
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } => true,
            Error::Request { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500,
            },
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Authentication(_) | Error::TokenExpired)
    }

    /// Returns `true` if the input was rejected before any network call.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::Config(_))
    }

    /// Returns the page attempt this error occurred on, if any.
    pub fn page(&self) -> Option<u32> {
        match self {
            Error::Request { page, .. } | Error::RateLimited { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Create a request error from an API error envelope.
    ///
    /// The Research API reports failures as
    /// `{"error": {"code": ..., "message": ..., "log_id": ...}}`.
    pub(crate) fn from_api_response(page: u32, status: Option<u16>, body: &Value) -> Self {
        let error = body.get("error");
        let field = |name: &str| {
            error
                .and_then(|e| e.get(name))
                .and_then(|v| v.as_str())
                .map(String::from)
        };

        Error::Request {
            page,
            status,
            code: field("code"),
            message: field("message")
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown API error".to_string()),
            log_id: field("log_id"),
        }
    }

    /// Create a request error from a transport failure.
    pub(crate) fn transport(page: u32, err: reqwest::Error) -> Self {
        Error::Request {
            page,
            status: err.status().map(|s| s.as_u16()),
            code: None,
            message: err.to_string(),
            log_id: None,
        }
    }
}
