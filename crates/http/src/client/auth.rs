//! Authentication API client methods

use super::{HubClient, RequestContext};
use crate::error::ClientError;
use crate::types::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshRequest, RegisterRequest,
    RegisterResponse, UsernameCheckResponse,
};
use attendancehub_core::SessionTokens;
use reqwest::Method;
use tracing::{debug, info};

impl HubClient {
    /// Current bearer token, if a session is active
    pub async fn session_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Replace the stored session credentials
    pub async fn set_session(&self, tokens: SessionTokens) {
        *self.session.write().await = Some(tokens);
    }

    /// Drop the stored session credentials
    pub async fn clear_session(&self) {
        *self.session.write().await = None;
    }

    /// Log in with an employee code and password.
    ///
    /// A successful response installs the returned session tokens.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ClientError> {
        let ctx = RequestContext::new(Method::POST, "/auth/login").json(&request)?;
        let response: LoginResponse = self.execute(ctx).await?;

        if response.success {
            if let Some(token) = response.token.clone() {
                self.set_session(SessionTokens::new(token, response.refresh_token.clone()))
                    .await;
                info!("session established");
            }
        }

        Ok(response)
    }

    /// Register a new employee
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        let ctx = RequestContext::new(Method::POST, "/auth/register").json(&request)?;
        self.execute(ctx).await
    }

    /// Whether `username` is still available
    pub async fn check_username(
        &self,
        username: &str,
    ) -> Result<UsernameCheckResponse, ClientError> {
        let ctx =
            RequestContext::new(Method::GET, "/auth/check-username").query("username", username);
        self.execute(ctx).await
    }

    /// Log out and drop the stored session
    pub async fn logout(&self) -> Result<LogoutResponse, ClientError> {
        let ctx = RequestContext::new(Method::POST, "/auth/logout");
        let response: LogoutResponse = self.execute(ctx).await?;

        if response.success {
            self.clear_session().await;
            debug!("session cleared after logout");
        }

        Ok(response)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// The refresh token is kept unless the server rotates it.
    pub async fn refresh_session(&self) -> Result<LoginResponse, ClientError> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or_else(|| ClientError::SessionExpired("no refresh token available".to_string()))?;

        let ctx = RequestContext::new(Method::POST, "/auth/refresh").json(&RefreshRequest {
            refresh_token: refresh_token.clone(),
        })?;
        let response: LoginResponse = self.execute(ctx).await?;

        if response.success {
            if let Some(token) = response.token.clone() {
                let rotated = response.refresh_token.clone().or(Some(refresh_token));
                self.set_session(SessionTokens::new(token, rotated)).await;
                info!("access token refreshed");
            }
        }

        Ok(response)
    }

    /// Refresh the session when the access token expires within
    /// `threshold_secs` seconds.
    ///
    /// No-op without a session or a refresh token.
    pub async fn ensure_fresh_session(&self, threshold_secs: i64) -> Result<(), ClientError> {
        let expiring = {
            let session = self.session.read().await;
            match session.as_ref() {
                Some(s) if s.refresh_token.is_some() => s.expires_within(threshold_secs),
                _ => false,
            }
        };

        if expiring {
            debug!("access token expiring soon, refreshing");
            self.refresh_session().await?;
        }

        Ok(())
    }
}
