//! Anti-forgery token lifecycle
//!
//! A single in-memory token record with wall-clock expiry, refreshed from
//! the server's token-issuing endpoint and reconciled against the
//! Double-Submit-Cookie copy in the shared cookie jar.

pub mod cookie;

use crate::config::{ClientConfig, CsrfConvention};
use crate::error::{ClientError, TokenError};
use crate::types::{ApiErrorBody, CsrfTokenResponse};
use chrono::Utc;
use reqwest::Client;
use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Margin subtracted from the expiry so a token is never attached right
/// before it lapses mid-flight
pub const VALIDITY_BUFFER_MS: i64 = 60_000;

/// A fetched anti-forgery token and its absolute expiry
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub value: String,
    /// Epoch milliseconds after which the token must be treated as invalid
    pub expires_at: i64,
}

impl TokenRecord {
    /// Valid while `now < expires_at - buffer`
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        !self.value.is_empty() && now_ms < self.expires_at - VALIDITY_BUFFER_MS
    }
}

/// In-memory anti-forgery token cache
///
/// Owns the only in-memory copy of the token. The cookie jar holds the
/// externally-authoritative copy whenever the server mirrors the token
/// into a cookie; [`CsrfTokenCache::get`] and [`CsrfTokenCache::refresh`]
/// prefer it over the cached value.
pub struct CsrfTokenCache {
    /// Dedicated client, so token fetches never pass back through the
    /// injecting pipeline
    http: Client,
    jar: Arc<Jar>,
    base: String,
    base_url: Url,
    convention: CsrfConvention,
    mixed_content: bool,
    record: RwLock<Option<TokenRecord>>,
}

impl CsrfTokenCache {
    /// Create a cache sharing `jar` with the request pipeline
    pub fn new(config: &ClientConfig, jar: Arc<Jar>) -> Result<Self, ClientError> {
        let base_url = config.parsed_base_url()?;

        let http = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(config.timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self {
            http,
            jar,
            base: config.base_url(),
            base_url,
            convention: config.csrf.clone(),
            mixed_content: config.mixed_content_risk(),
            record: RwLock::new(None),
        })
    }

    /// Produce a currently-valid token, fetching only when needed.
    ///
    /// With a valid cached record the cookie copy wins when present;
    /// otherwise the cached value is returned as-is. An expired or empty
    /// cache triggers a refresh.
    pub async fn get(&self) -> Result<String, TokenError> {
        let now_ms = Utc::now().timestamp_millis();
        let cached = {
            let record = self.record.read().await;
            record
                .as_ref()
                .filter(|r| r.is_valid_at(now_ms))
                .map(|r| r.value.clone())
        };

        if let Some(value) = cached {
            if let Some(cookie) = self.cookie_token() {
                return Ok(cookie);
            }
            return Ok(value);
        }

        self.refresh().await
    }

    /// Fetch a fresh token from the token-issuing endpoint.
    ///
    /// Concurrent refreshes are not coalesced; last write wins and a
    /// redundant fetch is harmless.
    pub async fn refresh(&self) -> Result<String, TokenError> {
        let url = self.token_url();
        debug!(%url, "fetching anti-forgery token");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify_network(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = ApiErrorBody::from_text(&text);
            let message = body.message.unwrap_or_else(|| status.to_string());
            warn!(%status, %message, "token fetch rejected");
            return Err(TokenError::from_status(status, message));
        }

        let body: CsrfTokenResponse = response
            .json()
            .await
            .map_err(|e| TokenError::Decode(e.to_string()))?;

        if !body.success {
            return Err(TokenError::Rejected(body.message.unwrap_or_else(|| {
                "token endpoint reported failure".to_string()
            })));
        }

        let expires_at = Utc::now().timestamp_millis() + body.expires_in * 1000;
        let mut value = body.csrf_token;

        // Double-Submit-Cookie reconciliation: the cookie copy wins
        if let Some(cookie) = self.cookie_token() {
            if cookie != value {
                warn!("anti-forgery cookie disagrees with the fetched token, using the cookie");
                value = cookie;
            }
        }

        *self.record.write().await = Some(TokenRecord {
            value: value.clone(),
            expires_at,
        });
        info!(expires_in = body.expires_in, "anti-forgery token refreshed");

        Ok(value)
    }

    /// Discard the in-memory record. The cookie is left alone; its
    /// lifecycle belongs to the server.
    pub async fn clear(&self) {
        *self.record.write().await = None;
        debug!("anti-forgery token cache cleared");
    }

    /// Whether the cached record is still usable; never touches the network
    pub async fn is_valid(&self) -> bool {
        let now_ms = Utc::now().timestamp_millis();
        self.record
            .read()
            .await
            .as_ref()
            .is_some_and(|r| r.is_valid_at(now_ms))
    }

    /// Current token for diagnostics/display, cookie copy first.
    ///
    /// Never fetches and performs no validity check; not for request
    /// signing.
    pub async fn peek(&self) -> Option<String> {
        if let Some(cookie) = self.cookie_token() {
            return Some(cookie);
        }
        self.record.read().await.as_ref().map(|r| r.value.clone())
    }

    /// Prefetch a token at application start; failure is logged, not fatal
    pub async fn initialize(&self) {
        match self.get().await {
            Ok(_) => debug!("anti-forgery token prefetched"),
            Err(e) => warn!(error = %e, "anti-forgery token prefetch failed"),
        }
    }

    /// Read the anti-forgery cookie from the shared jar
    fn cookie_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        cookie::token_from_header(header.to_str().ok()?, &self.convention.cookie_name)
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.base, self.convention.token_path)
    }

    fn classify_network(&self, err: &reqwest::Error) -> TokenError {
        if err.status().is_none() && self.mixed_content {
            return TokenError::MixedContent {
                url: self.token_url(),
            };
        }
        if err.is_timeout() {
            TokenError::Network(format!("request timed out: {err}"))
        } else {
            TokenError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_valid_strictly_before_buffer_edge() {
        let record = TokenRecord {
            value: "tok".to_string(),
            expires_at: 1_000_000,
        };

        assert!(record.is_valid_at(1_000_000 - VALIDITY_BUFFER_MS - 1));
        // Exactly at the buffer edge the token is already unusable
        assert!(!record.is_valid_at(1_000_000 - VALIDITY_BUFFER_MS));
        assert!(!record.is_valid_at(1_000_000));
    }

    #[test]
    fn empty_token_is_never_valid() {
        let record = TokenRecord {
            value: String::new(),
            expires_at: i64::MAX,
        };
        assert!(!record.is_valid_at(0));
    }
}
