//! AttendanceHub HTTP client
//!
//! Wraps the AttendanceHub API behind an anti-forgery-aware request
//! pipeline: a token cache with wall-clock expiry, Double-Submit-Cookie
//! reconciliation, and a single automatic retry when the server rejects
//! the anti-forgery token.

pub mod client;
pub mod config;
pub mod csrf;
pub mod error;
pub mod types;

pub use client::{HubClient, RequestContext};
pub use config::{ClientConfig, CsrfConvention, Environment};
pub use csrf::CsrfTokenCache;
pub use error::{ClientError, TokenError};

/// User agent attached by every client this crate builds
pub(crate) const USER_AGENT: &str = "attendancehub-client/0.1.0";
