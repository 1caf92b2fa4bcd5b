//! Client configuration
//!
//! The base URL and environment are supplied by the embedding application,
//! either directly or through `ATTENDANCEHUB_*` environment variables.

use crate::error::ClientError;
use std::time::Duration;
use url::Url;

/// Environment variable overriding the API base URL
pub const ENV_API_BASE_URL: &str = "ATTENDANCEHUB_API_BASE_URL";
/// Environment variable selecting the deployment environment
pub const ENV_ENVIRONMENT: &str = "ATTENDANCEHUB_ENVIRONMENT";
/// Environment variable carrying the origin of the embedding page
pub const ENV_PAGE_ORIGIN: &str = "ATTENDANCEHUB_PAGE_ORIGIN";

/// Deployment environment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Default API base URL when no override is configured
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Development => "http://localhost:8091/api",
            Self::Production => "https://app.attendancehub.example.com/api",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ClientError::Configuration(format!(
                "unknown environment: {other}"
            ))),
        }
    }
}

/// Header, cookie, and endpoint names of the server's anti-forgery contract
///
/// These are configuration, not protocol choices made by the client: the
/// server decides which names it honors.
#[derive(Debug, Clone)]
pub struct CsrfConvention {
    /// Header the token rides on every non-token-fetch request
    pub header_name: String,
    /// Cookie the server mirrors the token into (Double-Submit-Cookie)
    pub cookie_name: String,
    /// Path of the token-issuing endpoint, relative to the base URL
    pub token_path: String,
}

impl Default for CsrfConvention {
    fn default() -> Self {
        Self {
            header_name: "X-XSRF-TOKEN".to_string(),
            cookie_name: "XSRF-TOKEN".to_string(),
            token_path: "/csrf/token".to_string(),
        }
    }
}

impl CsrfConvention {
    /// The `X-CSRF-TOKEN`/`CSRF-TOKEN` pair honored by older deployments
    pub fn legacy() -> Self {
        Self {
            header_name: "X-CSRF-TOKEN".to_string(),
            cookie_name: "CSRF-TOKEN".to_string(),
            token_path: "/csrf/token".to_string(),
        }
    }
}

/// Configuration for the AttendanceHub client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub environment: Environment,
    /// Overrides the environment's default endpoint when set
    pub api_base_url: Option<String>,
    /// Origin of the page embedding the client, for mixed-content detection
    pub page_origin: Option<String>,
    /// Request timeout for every network call
    pub timeout: Duration,
    pub csrf: CsrfConvention,
}

impl ClientConfig {
    /// Create a configuration with the environment's defaults
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            api_base_url: None,
            page_origin: None,
            timeout: Duration::from_secs(10),
            csrf: CsrfConvention::default(),
        }
    }

    /// Read configuration from `ATTENDANCEHUB_*` environment variables
    pub fn from_env() -> Self {
        let environment = std::env::var(ENV_ENVIRONMENT)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Development);

        let mut config = Self::new(environment);
        config.api_base_url = std::env::var(ENV_API_BASE_URL).ok().filter(|v| !v.is_empty());
        config.page_origin = std::env::var(ENV_PAGE_ORIGIN).ok().filter(|v| !v.is_empty());
        config
    }

    /// Effective API base URL, without a trailing slash
    pub fn base_url(&self) -> String {
        self.api_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Parse and validate the effective base URL
    pub fn parsed_base_url(&self) -> Result<Url, ClientError> {
        let base = self.base_url();
        Url::parse(&base)
            .map_err(|e| ClientError::Configuration(format!("invalid base URL {base:?}: {e}")))
    }

    /// True when the page is served over https but the API endpoint is not.
    ///
    /// Browsers silently block such requests, which otherwise surface as
    /// opaque network failures.
    pub fn mixed_content_risk(&self) -> bool {
        let page_is_https = self
            .page_origin
            .as_deref()
            .is_some_and(|origin| origin.starts_with("https:"));
        page_is_https && self.base_url().starts_with("http:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_aliases() {
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "Development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn override_wins_over_environment_default() {
        let mut config = ClientConfig::new(Environment::Development);
        assert_eq!(config.base_url(), "http://localhost:8091/api");

        config.api_base_url = Some("https://api.internal.example.com/api/".to_string());
        assert_eq!(config.base_url(), "https://api.internal.example.com/api");
    }

    #[test]
    fn detects_mixed_content() {
        let mut config = ClientConfig::new(Environment::Development);
        assert!(!config.mixed_content_risk());

        config.page_origin = Some("https://app.example.com".to_string());
        assert!(config.mixed_content_risk());

        config.api_base_url = Some("https://api.example.com/api".to_string());
        assert!(!config.mixed_content_risk());
    }

    #[test]
    fn legacy_convention_uses_the_older_name_pair() {
        let convention = CsrfConvention::legacy();
        assert_eq!(convention.header_name, "X-CSRF-TOKEN");
        assert_eq!(convention.cookie_name, "CSRF-TOKEN");
        assert_eq!(convention.token_path, CsrfConvention::default().token_path);
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let mut config = ClientConfig::new(Environment::Development);
        config.api_base_url = Some("not a url".to_string());
        assert!(matches!(
            config.parsed_base_url(),
            Err(ClientError::Configuration(_))
        ));
    }
}
