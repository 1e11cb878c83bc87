//! Authentication for the TikTok Research API.
//!
//! The Research API uses the OAuth2 client-credentials grant: a long-lived
//! client key and client secret are exchanged for a short-lived
//! [`BearerToken`] (about two hours). Renewing the token is up to the caller;
//! a request made with an expired token fails with
//! [`Error::TokenExpired`](crate::Error::TokenExpired) before anything is sent.
//!
//! ```no_run
//! use tiktok_research::{ClientConfig, TokenProvider};
//!
//! # async fn example() -> tiktok_research::Result<()> {
//! let provider = TokenProvider::new(&ClientConfig::default())?;
//! let token = provider.create_token("your-client-key", "your-client-secret").await?;
//! println!("token valid until {}", token.expires_at());
//! # Ok(())
//! # }
//! ```

mod token;

pub use token::{BearerToken, TokenProvider};
