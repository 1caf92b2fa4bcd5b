//! Client error types

use crate::types::ApiErrorBody;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while obtaining an anti-forgery token
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token endpoint demands authentication
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Token endpoint refused access
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Token endpoint failed server-side
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// No response received
    #[error("Network failure: {0}")]
    Network(String),

    /// Page served over https but the token endpoint is not
    #[error("Mixed content blocked: token endpoint {url} is not https")]
    MixedContent { url: String },

    /// Endpoint answered but declined to issue a token
    #[error("Token endpoint rejected the request: {0}")]
    Rejected(String),

    /// Response body did not match the token contract
    #[error("Malformed token response: {0}")]
    Decode(String),
}

impl TokenError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            401 => Self::Unauthenticated(message),
            403 => Self::Forbidden(message),
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Page served over https but the API endpoint is not
    #[error("Mixed content blocked: API endpoint {url} is not https")]
    MixedContent { url: String },

    /// Session token expired or missing
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Anti-forgery token rejected again after the single retry
    #[error("Anti-forgery validation failed: {0}")]
    CsrfValidationFailed(String),

    /// Structured field errors from the API
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: HashMap<String, Vec<String>>,
    },

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Could not obtain an anti-forgery token for the request
    #[error("Token acquisition failed: {0}")]
    TokenFetch(#[from] TokenError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::SessionExpired(message),
            403 => Self::CsrfValidationFailed(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Classify a non-success response from its parsed body
    pub fn from_body(status: reqwest::StatusCode, body: ApiErrorBody) -> Self {
        if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
            return Self::Validation {
                message: body
                    .message
                    .unwrap_or_else(|| "Validation failed".to_string()),
                errors,
            };
        }
        let message = body.message.unwrap_or_else(|| status.to_string());
        Self::from_status(status, message)
    }
}
