//! Session credentials and access-token expiry inspection

use crate::error::{CoreError, CoreResult};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The bearer credential pair identifying the logged-in user
///
/// Distinct from the anti-forgery token: this is the application-level
/// authentication credential attached as `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Access token sent with every authenticated request
    pub access_token: String,
    /// Refresh token used to obtain a new access token, when issued
    pub refresh_token: Option<String>,
}

/// Claims the client reads from an access token payload
#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: i64,
}

impl SessionTokens {
    /// Create a new credential pair
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
        }
    }

    /// Whether the access token expires within `threshold_secs` seconds.
    ///
    /// An undecodable token counts as expired.
    pub fn expires_within(&self, threshold_secs: i64) -> bool {
        match token_expiry(&self.access_token) {
            Ok(expiry) => (expiry - Utc::now()).num_seconds() < threshold_secs,
            Err(_) => true,
        }
    }
}

/// Read the `exp` claim from a JWT access token without verifying it.
///
/// The client never holds the signing secret, so the signature cannot be
/// checked here; the server remains the authority on token validity.
pub fn token_expiry(token: &str) -> CoreResult<DateTime<Utc>> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| CoreError::malformed_token("missing payload segment"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| CoreError::malformed_token(e.to_string()))?;

    let claims: TokenClaims = serde_json::from_slice(&bytes)?;

    DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .ok_or_else(|| CoreError::malformed_token("exp claim out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"42","exp":{exp}}}"#));
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn reads_exp_claim() {
        let exp = Utc::now().timestamp() + 3600;
        let expiry = token_expiry(&token_with_exp(exp)).unwrap();
        assert_eq!(expiry.timestamp(), exp);
    }

    #[test]
    fn rejects_token_without_payload() {
        assert!(token_expiry("not-a-jwt").is_err());
    }

    #[test]
    fn rejects_garbage_payload() {
        assert!(token_expiry("a.!!!.c").is_err());
    }

    #[test]
    fn fresh_token_is_not_expiring() {
        let tokens = SessionTokens::new(token_with_exp(Utc::now().timestamp() + 3600), None);
        assert!(!tokens.expires_within(300));
    }

    #[test]
    fn near_expiry_token_is_expiring() {
        let tokens = SessionTokens::new(token_with_exp(Utc::now().timestamp() + 60), None);
        assert!(tokens.expires_within(300));
    }

    #[test]
    fn undecodable_token_counts_as_expired() {
        let tokens = SessionTokens::new("garbage", None);
        assert!(tokens.expires_within(300));
    }

    #[test]
    fn empty_refresh_token_is_dropped() {
        let tokens = SessionTokens::new("token", Some(String::new()));
        assert!(tokens.refresh_token.is_none());
    }
}
