//! AttendanceHub API client
//!
//! Every call runs through the anti-forgery pipeline: token injection,
//! bearer attachment, and a single automatic retry when the server
//! rejects the anti-forgery token.

pub mod auth;
pub mod diagnostics;

use crate::config::ClientConfig;
use crate::csrf::CsrfTokenCache;
use crate::error::ClientError;
use crate::types::ApiErrorBody;
use attendancehub_core::SessionTokens;
use reqwest::cookie::Jar;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Immutable description of one logical request.
///
/// Retrying never mutates shared state: [`RequestContext::retried`]
/// derives a fresh context with the attempt count bumped.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    path: String,
    body: Option<Value>,
    query: Vec<(String, String)>,
    retry_count: u8,
}

impl RequestContext {
    /// Describe a request to `path`, relative to the base URL
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            retry_count: 0,
        }
    }

    /// Attach a JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// How many times this logical request has been resent
    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// Copy of this context marked as retried
    fn retried(&self) -> Self {
        let mut next = self.clone();
        next.retry_count = self.retry_count + 1;
        next
    }

    fn targets(&self, path: &str) -> bool {
        self.path.starts_with(path)
    }
}

/// Client for the AttendanceHub API
#[derive(Clone)]
pub struct HubClient {
    http: Client,
    base: String,
    token_path: String,
    csrf_header: String,
    mixed_content: bool,
    csrf: Arc<CsrfTokenCache>,
    session: Arc<RwLock<Option<SessionTokens>>>,
}

impl HubClient {
    /// Create a client from configuration
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::builder().config(config).build()
    }

    /// Create a client configured from `ATTENDANCEHUB_*` variables
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env())
    }

    /// Create a new client builder
    pub fn builder() -> HubClientBuilder {
        HubClientBuilder::default()
    }

    /// Effective API base URL
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// The anti-forgery token cache backing this client
    pub fn csrf(&self) -> &CsrfTokenCache {
        &self.csrf
    }

    /// Execute a request through the pipeline and decode the JSON response
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        ctx: RequestContext,
    ) -> Result<T, ClientError> {
        let response = self.dispatch(ctx).await?;
        Ok(response.json().await?)
    }

    /// Drive one logical request through the retry state machine.
    ///
    /// 401 clears both credential stores and is never retried. The first
    /// 403 refreshes the token and resends once; a second 403 is
    /// terminal. Everything else maps through the error taxonomy
    /// unchanged.
    async fn dispatch(&self, mut ctx: RequestContext) -> Result<reqwest::Response, ClientError> {
        loop {
            let response = self.send_once(&ctx).await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            let text = response.text().await.unwrap_or_default();
            let body = ApiErrorBody::from_text(&text);

            match status.as_u16() {
                401 => {
                    // Both credential stores are stale once the session is gone
                    self.csrf.clear().await;
                    self.clear_session().await;
                    let message = body
                        .message
                        .unwrap_or_else(|| "authentication required".to_string());
                    warn!(path = %ctx.path, "session expired");
                    return Err(ClientError::SessionExpired(message));
                }
                403 if ctx.retry_count == 0 => {
                    warn!(path = %ctx.path, "anti-forgery token rejected, refreshing and retrying once");
                    self.csrf.refresh().await?;
                    ctx = ctx.retried();
                }
                403 => {
                    let message = body
                        .message
                        .unwrap_or_else(|| "anti-forgery token rejected".to_string());
                    return Err(ClientError::CsrfValidationFailed(message));
                }
                _ => return Err(ClientError::from_body(status, body)),
            }
        }
    }

    /// Build and send a single attempt for `ctx`
    async fn send_once(&self, ctx: &RequestContext) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base, ctx.path);
        let mut request = self.http.request(ctx.method.clone(), url);

        if !ctx.query.is_empty() {
            request = request.query(&ctx.query);
        }

        if let Some(token) = self.session_token().await {
            request = request.bearer_auth(token);
        }

        // The token-issuing endpoint must never receive an injected token
        if !ctx.targets(&self.token_path) {
            let token = self.csrf.get().await?;
            request = request.header(self.csrf_header.as_str(), token);
        }

        if let Some(body) = &ctx.body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))
    }

    fn classify_send_error(&self, err: reqwest::Error) -> ClientError {
        if err.status().is_none() && self.mixed_content {
            return ClientError::MixedContent {
                url: self.base.clone(),
            };
        }
        ClientError::Request(err)
    }
}

/// Builder for [`HubClient`]
#[derive(Default)]
pub struct HubClientBuilder {
    config: Option<ClientConfig>,
    jar: Option<Arc<Jar>>,
}

impl HubClientBuilder {
    /// Set the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share a pre-populated cookie jar (the browser cookie store analogue)
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.jar = Some(jar);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HubClient, ClientError> {
        let config = self
            .config
            .ok_or_else(|| ClientError::Configuration("config is required".into()))?;

        let jar = self.jar.unwrap_or_default();
        let csrf = CsrfTokenCache::new(&config, Arc::clone(&jar))?;

        let http = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(config.timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(HubClient {
            http,
            base: config.base_url(),
            token_path: config.csrf.token_path.clone(),
            csrf_header: config.csrf.header_name.clone(),
            mixed_content: config.mixed_content_risk(),
            csrf: Arc::new(csrf),
            session: Arc::new(RwLock::new(None)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retried_context_bumps_the_count_without_mutating_the_original() {
        let ctx = RequestContext::new(Method::POST, "/auth/register");
        let retried = ctx.retried();

        assert_eq!(ctx.retry_count(), 0);
        assert_eq!(retried.retry_count(), 1);
    }

    #[test]
    fn token_endpoint_is_recognized() {
        let ctx = RequestContext::new(Method::GET, "/csrf/token");
        assert!(ctx.targets("/csrf/token"));

        let ctx = RequestContext::new(Method::POST, "/auth/login");
        assert!(!ctx.targets("/csrf/token"));
    }
}
