//! Client configuration options.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Base URL of the public Research API.
pub const DEFAULT_BASE_URL: &str = "https://open.tiktokapis.com";

/// Path of the client-credentials token endpoint.
pub const DEFAULT_AUTH_PATH: &str = "/v2/oauth/token/";

/// Largest number of records the API returns per request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration for the Research API client and token provider.
///
/// # Example
///
/// ```
/// use tiktok_research::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-study/1.0")
///     .with_page_size(50);
/// assert_eq!(config.page_size, 50);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host requests are sent to
    pub base_url: String,
    /// Path of the token endpoint, relative to `base_url`
    pub auth_path: String,
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Records requested per page (1 to [`MAX_PAGE_SIZE`])
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("tiktok-research/{} (Rust)", env!("CARGO_PKG_VERSION")),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at a different host, e.g. a proxy or a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the token endpoint path.
    pub fn with_auth_path(mut self, auth_path: impl Into<String>) -> Self {
        self.auth_path = auth_path.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the number of records requested per page, clamped to the range
    /// the API accepts.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Resolve an endpoint path against the base URL.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url> {
        let base = self.parsed_base_url()?;
        Ok(base.join(path)?)
    }

    /// Check the configuration for values that can never work.
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;
        if self.auth_path.is_empty() {
            return Err(Error::Config("auth path must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(Error::Config(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        Ok(())
    }

    fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must use http or https, got {}",
                url.scheme()
            )));
        }
        Ok(url)
    }
}
