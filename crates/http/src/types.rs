//! Wire types for the AttendanceHub API
//!
//! The server speaks camelCase JSON; every DTO here renames accordingly.

use attendancehub_core::{LocationType, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Login request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Employee code in email format
    pub employee_code: String,
    pub password: String,
}

/// Login response payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    pub success: bool,
    /// Access token for `Authorization: Bearer`
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds
    pub expires_in: Option<i64>,
    pub user: Option<User>,
    pub message: Option<String>,
    pub csrf_error: Option<bool>,
}

/// Registration request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Username in email format
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub location_type: LocationType,
    pub client_latitude: Option<String>,
    pub client_longitude: Option<String>,
    pub department_id: i64,
    pub position_id: i64,
    pub manager_id: i64,
}

/// Registered user echoed back on success
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub location_type: LocationType,
    pub client_latitude: Option<String>,
    pub client_longitude: Option<String>,
    pub department_id: i64,
    pub position_id: i64,
    pub manager_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Registration response payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<RegisteredUser>,
    /// Field name to validation messages
    pub errors: Option<HashMap<String, Vec<String>>>,
    pub csrf_error: Option<bool>,
}

/// Logout response payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Username availability response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsernameCheckResponse {
    pub available: bool,
    pub csrf_error: Option<bool>,
}

/// Access-token refresh request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body of the token-issuing endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub success: bool,
    pub csrf_token: String,
    /// Header the server expects the token under
    pub header_name: Option<String>,
    /// Form parameter alternative to the header
    pub parameter_name: Option<String>,
    /// Token lifetime in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of the anti-forgery status endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsrfStatusResponse {
    pub success: bool,
    pub csrf_protection_enabled: bool,
    pub has_valid_token: bool,
    pub header_name: Option<String>,
    pub parameter_name: Option<String>,
    /// Truncated server-side token, for display only
    pub server_token: Option<String>,
    /// Truncated header echo, for display only
    pub header_token: Option<String>,
    pub protocol: Option<String>,
    pub message: Option<String>,
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiErrorBody {
    pub success: bool,
    pub message: Option<String>,
    pub errors: Option<HashMap<String, Vec<String>>>,
    pub csrf_error: Option<bool>,
    pub code: Option<String>,
}

impl ApiErrorBody {
    /// Parse an error body, falling back to the raw text as the message
    pub fn from_text(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| Self {
            message: (!text.is_empty()).then(|| text.to_string()),
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_serializes_to_camel_case() {
        let body = serde_json::to_value(LoginRequest {
            employee_code: "e0001@example.com".into(),
            password: "secret".into(),
        })
        .unwrap();

        assert_eq!(body["employeeCode"], "e0001@example.com");
    }

    #[test]
    fn csrf_token_response_parses_controller_body() {
        let body: CsrfTokenResponse = serde_json::from_str(
            r#"{
                "success": true,
                "csrfToken": "abc123",
                "headerName": "X-XSRF-TOKEN",
                "parameterName": "_csrf",
                "expiresIn": 1800,
                "message": "CSRF token generated successfully"
            }"#,
        )
        .unwrap();

        assert_eq!(body.csrf_token, "abc123");
        assert_eq!(body.expires_in, 1800);
    }

    #[test]
    fn error_body_falls_back_to_raw_text() {
        let body = ApiErrorBody::from_text("upstream timeout");
        assert_eq!(body.message.as_deref(), Some("upstream timeout"));

        let body = ApiErrorBody::from_text("");
        assert!(body.message.is_none());
    }
}
