//! Connection and environment diagnostics

use super::HubClient;
use crate::config::{ClientConfig, Environment};
use crate::types::CsrfStatusResponse;
use std::time::{Duration, Instant};

/// Result of probing the anti-forgery status endpoint
#[derive(Debug, Clone)]
pub struct ConnectionTest {
    pub success: bool,
    /// Protocol reported by the server, `"unknown"` when unavailable
    pub protocol: String,
    pub endpoint: String,
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl HubClient {
    /// Probe `GET {base}/csrf/status` and time the round-trip.
    ///
    /// Runs outside the injection pipeline; a probe must not mutate the
    /// token cache.
    pub async fn test_connection(&self) -> ConnectionTest {
        let endpoint = self.base.clone();
        let url = format!("{}/csrf/status", self.base);
        let started = Instant::now();

        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                let elapsed = started.elapsed();
                let body: CsrfStatusResponse = response.json().await.unwrap_or_default();
                ConnectionTest {
                    success: true,
                    protocol: body.protocol.unwrap_or_else(|| "unknown".to_string()),
                    endpoint,
                    error: None,
                    elapsed,
                }
            }
            Ok(response) => ConnectionTest {
                success: false,
                protocol: "unknown".to_string(),
                endpoint,
                error: Some(format!("HTTP {}", response.status())),
                elapsed: started.elapsed(),
            },
            Err(e) => ConnectionTest {
                success: false,
                protocol: "unknown".to_string(),
                endpoint,
                error: Some(e.to_string()),
                elapsed: started.elapsed(),
            },
        }
    }
}

/// Environment diagnosis for support tooling
#[derive(Debug, Clone)]
pub struct EnvironmentReport {
    /// Protocol of the embedding page, `"unknown"` when not configured
    pub page_protocol: String,
    pub api_base_url: String,
    pub environment: String,
    pub mixed_content_risk: bool,
    pub recommendations: Vec<String>,
}

/// Diagnose a configuration without touching the network
pub fn diagnose(config: &ClientConfig) -> EnvironmentReport {
    let page_protocol = config
        .page_origin
        .as_deref()
        .and_then(|origin| origin.split(':').next())
        .map_or_else(|| "unknown".to_string(), |scheme| format!("{scheme}:"));

    let api_base_url = config.base_url();
    let mixed_content_risk = config.mixed_content_risk();

    let mut recommendations = Vec::new();
    if mixed_content_risk {
        recommendations.push("serve the API over https when the page is served over https".to_string());
    }
    if config.environment == Environment::Production && !api_base_url.starts_with("https:") {
        recommendations.push("production deployments require an https API endpoint".to_string());
    }

    EnvironmentReport {
        page_protocol,
        api_base_url,
        environment: config.environment.as_str().to_string(),
        mixed_content_risk,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_configuration_has_no_recommendations() {
        let mut config = ClientConfig::new(Environment::Production);
        config.page_origin = Some("https://app.example.com".to_string());

        let report = diagnose(&config);
        assert!(!report.mixed_content_risk);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.page_protocol, "https:");
    }

    #[test]
    fn mixed_content_is_flagged_with_recommendations() {
        let mut config = ClientConfig::new(Environment::Production);
        config.page_origin = Some("https://app.example.com".to_string());
        config.api_base_url = Some("http://api.example.com/api".to_string());

        let report = diagnose(&config);
        assert!(report.mixed_content_risk);
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn unset_page_origin_reports_unknown_protocol() {
        let report = diagnose(&ClientConfig::new(Environment::Development));
        assert_eq!(report.page_protocol, "unknown");
    }
}
