//! Bearer tokens and the client-credentials exchange.

use chrono::{DateTime, Duration, Utc};
use reqwest::header::CACHE_CONTROL;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::client::{build_http_client, ClientConfig};
use crate::{Error, Result};

/// A short-lived credential presented on every Research API call.
///
/// The token string is kept in a [`SecretString`] and never shows up in
/// `Debug` output.
#[derive(Clone)]
pub struct BearerToken {
    access_token: SecretString,
    token_type: String,
    expires_at: DateTime<Utc>,
}

impl BearerToken {
    /// Wrap an existing access token, e.g. one cached from an earlier
    /// exchange.
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }

    /// Token type reported by the server (normally `Bearer`).
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Expiration time of the token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if the token will expire within the given buffer period.
    pub fn expires_within(&self, buffer: Duration) -> bool {
        Utc::now() + buffer >= self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).max(Duration::zero())
    }

    /// The raw token string.
    pub fn expose_secret(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Value of the `Authorization` header for this token.
    pub(crate) fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Exchanges client credentials for [`BearerToken`]s.
///
/// Every call to [`create_token`](Self::create_token) performs exactly one
/// request and returns an independent token.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    http: reqwest::Client,
    token_url: Url,
}

impl TokenProvider {
    /// Create a provider for the auth endpoint named in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = build_http_client(config)?;
        Self::with_http(http, config)
    }

    pub(crate) fn with_http(http: reqwest::Client, config: &ClientConfig) -> Result<Self> {
        let token_url = config.endpoint_url(&config.auth_path)?;
        Ok(Self { http, token_url })
    }

    /// Exchange a client key and secret for a bearer token.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if either credential is empty (no request is
    ///   made)
    /// - [`Error::Authentication`] if the server rejects the credentials or
    ///   cannot be reached
    /// - [`Error::ResponseFormat`] if a successful response lacks a token
    pub async fn create_token(
        &self,
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<BearerToken> {
        let client_key = client_key.into();
        let client_secret = SecretString::from(client_secret.into());

        if client_key.trim().is_empty() {
            return Err(Error::InvalidInput("client key must not be empty".to_string()));
        }
        if client_secret.expose_secret().trim().is_empty() {
            return Err(Error::InvalidInput("client secret must not be empty".to_string()));
        }

        tracing::debug!(url = %self.token_url, "requesting bearer token");

        let response = self
            .http
            .post(self.token_url.clone())
            .header(CACHE_CONTROL, "no-cache")
            .form(&[
                ("client_key", client_key.as_str()),
                ("client_secret", client_secret.expose_secret()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| Error::Authentication(format!("Token endpoint unreachable: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Authentication(format!("Token response unreadable: {}", e)))?;

        if !status.is_success() {
            let body: Value = serde_json::from_str(&body).unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "token exchange rejected");
            return Err(Error::Authentication(format!(
                "Token exchange failed ({}): {}",
                status.as_u16(),
                describe_oauth_error(&body)
            )));
        }

        let body: Value = serde_json::from_str(&body)
            .map_err(|e| Error::ResponseFormat(format!("token response is not JSON: {}", e)))?;

        // Rejections can also arrive with a 2xx status.
        if body.get("error").and_then(Value::as_str).is_some_and(|e| !e.is_empty()) {
            tracing::warn!("token exchange rejected");
            return Err(Error::Authentication(format!(
                "Token exchange failed: {}",
                describe_oauth_error(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| Error::ResponseFormat(format!("unexpected token response: {}", e)))?;

        token.into_bearer(Utc::now())
    }
}

fn describe_oauth_error(body: &Value) -> String {
    let error = body.get("error").and_then(Value::as_str).unwrap_or("unknown_error");
    match body.get("error_description").and_then(Value::as_str) {
        Some(description) if !description.is_empty() => format!("{}: {}", error, description),
        _ => error.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_bearer(self, received_at: DateTime<Utc>) -> Result<BearerToken> {
        let expires_at = Duration::try_seconds(self.expires_in)
            .and_then(|lifetime| received_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                Error::ResponseFormat(format!("token lifetime out of range: {} seconds", self.expires_in))
            })?;

        Ok(BearerToken {
            access_token: SecretString::from(self.access_token),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at,
        })
    }
}
