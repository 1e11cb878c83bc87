//! HTTP client implementation for the Research API.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::api::{UsersService, VideosService};
use crate::auth::{BearerToken, TokenProvider};
use crate::{Error, Result};

use super::config::ClientConfig;

/// Seconds to wait after a 429 when the server sends no `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 10;

/// The main client for the TikTok Research API.
///
/// A client holds one [`BearerToken`], the connection pool and the
/// configuration. It is immutable and cheap to clone; renewing the token
/// means building a new client with [`with_token`](Self::with_token).
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use futures_util::StreamExt;
/// use tiktok_research::ResearchClient;
/// use tiktok_research::models::{Condition, Query, QueryField};
///
/// # async fn example() -> tiktok_research::Result<()> {
/// let client = ResearchClient::authenticate("client-key", "client-secret").await?;
///
/// let query = Query::builder()
///     .and(Condition::eq(QueryField::Keyword, "animal"))
///     .build()?;
///
/// let mut videos = client.videos().start_query(
///     query,
///     NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
///     Some(500),
/// )?;
///
/// while let Some(video) = videos.next().await {
///     println!("{:?}", video?.id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ResearchClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) token: BearerToken,
    pub(crate) config: ClientConfig,
    base_url: Url,
}

/// Build the shared `reqwest` client for a configuration.
pub(crate) fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    config.validate()?;
    Ok(reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .build()?)
}

impl ResearchClient {
    /// Exchange client credentials for a token and create a client with the
    /// default configuration.
    pub async fn authenticate(
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        Self::authenticate_with_config(client_key, client_secret, ClientConfig::default()).await
    }

    /// Exchange client credentials for a token and create a client with a
    /// custom configuration.
    pub async fn authenticate_with_config(
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = build_http_client(&config)?;
        let token = TokenProvider::with_http(http.clone(), &config)?
            .create_token(client_key, client_secret)
            .await?;
        Self::from_parts(http, token, config)
    }

    /// Create a client from an existing token with the default configuration.
    pub fn new(token: BearerToken) -> Result<Self> {
        Self::with_config(token, ClientConfig::default())
    }

    /// Create a client from an existing token and custom configuration.
    pub fn with_config(token: BearerToken, config: ClientConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        Self::from_parts(http, token, config)
    }

    fn from_parts(http: reqwest::Client, token: BearerToken, config: ClientConfig) -> Result<Self> {
        let base_url = config.endpoint_url("/")?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                token,
                config,
                base_url,
            }),
        })
    }

    /// A client using `token` that shares this client's connection pool and
    /// configuration.
    ///
    /// Streams already started keep the token they were started with.
    pub fn with_token(&self, token: BearerToken) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http: self.inner.http.clone(),
                token,
                config: self.inner.config.clone(),
                base_url: self.inner.base_url.clone(),
            }),
        }
    }

    /// A token provider sharing this client's connection pool and
    /// configuration.
    pub fn token_provider(&self) -> Result<TokenProvider> {
        TokenProvider::with_http(self.inner.http.clone(), &self.inner.config)
    }

    /// Get the video service.
    pub fn videos(&self) -> VideosService {
        VideosService::new(self.inner.clone())
    }

    /// Get the user service.
    pub fn users(&self) -> UsersService {
        UsersService::new(self.inner.clone())
    }

    /// Get the token this client authenticates with.
    pub fn token(&self) -> &BearerToken {
        &self.inner.token
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl ClientInner {
    /// Refuse to send a token that has already expired.
    pub(crate) fn ensure_token_valid(&self) -> Result<()> {
        if self.token.is_expired() {
            return Err(Error::TokenExpired);
        }
        Ok(())
    }

    /// Build request headers with authentication.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.token.authorization())
                .map_err(|_| Error::InvalidInput("Invalid token format".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    /// POST a JSON body and return the `data` member of the response
    /// envelope.
    ///
    /// `page` is the 1-based page attempt reported in errors; single-shot
    /// endpoints pass 1.
    pub(crate) async fn post_data<B: Serialize + ?Sized>(
        &self,
        path: &str,
        fields: &str,
        body: &B,
        page: u32,
    ) -> Result<Value> {
        self.ensure_token_valid()?;

        let url = self.base_url.join(path)?;
        let headers = self.build_headers()?;

        let mut request = self.http.post(url).headers(headers);
        if !fields.is_empty() {
            request = request.query(&[("fields", fields)]);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport(page, e))?;

        self.handle_response(response, page).await
    }

    /// POST a JSON body and deserialize the `data` member into `T`.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        fields: &str,
        body: &B,
    ) -> Result<T> {
        let data = self.post_data(path, fields, body, 1).await?;
        T::deserialize(&data).map_err(|e| Error::ResponseFormat(format!("{}: {}", path, e)))
    }

    /// Handle an API response.
    async fn handle_response(&self, response: reqwest::Response, page: u32) -> Result<Value> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport(page, e))?;

        if !status.is_success() {
            let status_code = status.as_u16();
            let body: Value = serde_json::from_slice(&bytes).unwrap_or_default();
            tracing::warn!(status = status_code, page, "request rejected");

            if status_code == 429 {
                return Err(Error::RateLimited {
                    page,
                    retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
                });
            }

            if status_code == 401 {
                let message = body
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .unwrap_or("Bearer token rejected")
                    .to_string();
                return Err(Error::Authentication(message));
            }

            return Err(Error::from_api_response(page, Some(status_code), &body));
        }

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::ResponseFormat(format!("response is not JSON: {}", e)))?;

        let code = body
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_str());
        if matches!(code, Some(code) if code != "ok") {
            tracing::warn!(code, page, "API reported an error");
            return Err(Error::from_api_response(page, Some(status.as_u16()), &body));
        }

        match body {
            Value::Object(mut envelope) => envelope
                .remove("data")
                .ok_or_else(|| Error::ResponseFormat("response has no `data` member".to_string())),
            other => Err(Error::ResponseFormat(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Clone for ResearchClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for ResearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchClient")
            .field("token", &self.inner.token)
            .field("config", &self.inner.config)
            .finish()
    }
}
