//! Connection configuration for the rule service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{Result, ServiceError};

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Header carrying the region on every request.
pub const REGION_HEADER: &str = "x-logicnet-region";

/// Rule service client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Region nodes are created in
    #[serde(default = "default_region")]
    pub region: String,

    /// Credentials profile
    #[serde(default)]
    pub profile: Option<String>,

    /// Extra headers added to every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token resolved from the credentials profile
    #[serde(skip)]
    pub token: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            region: default_region(),
            profile: None,
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

impl ServiceConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Merge headers given as `k1=v1,k2=v2`. Later keys win.
    pub fn with_header_list(mut self, list: &str) -> Result<Self> {
        self.headers.extend(parse_header_list(list)?);
        Ok(self)
    }
}

/// Parse headers given as `k1=v1,k2=v2`.
pub fn parse_header_list(list: &str) -> Result<BTreeMap<String, String>> {
    let mut headers = BTreeMap::new();
    for pair in list.split(',').filter(|p| !p.trim().is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            ServiceError::Config(format!("header {:?} is not in the form key=value", pair))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ServiceError::Config(format!("header {:?} has an empty key", pair)));
        }
        tracing::debug!(key, value, "Will use header for all requests");
        headers.insert(key.to_string(), value.to_string());
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.region, DEFAULT_REGION);
        assert!(config.headers.is_empty());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn parses_header_list() {
        let headers = parse_header_list("a=1,b=x=y").unwrap();
        assert_eq!(headers.get("a").map(String::as_str), Some("1"));
        assert_eq!(headers.get("b").map(String::as_str), Some("x=y"));
        assert!(parse_header_list("").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(matches!(
            parse_header_list("novalue"),
            Err(ServiceError::Config(_))
        ));
        assert!(matches!(parse_header_list("=v"), Err(ServiceError::Config(_))));
    }

    #[test]
    fn deserializes_partial_toml() {
        let config: ServiceConfig = toml::from_str(
            r#"
            region = "us-east-1"
            [headers]
            x-trace = "on"
            "#,
        )
        .unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.headers.len(), 1);
    }
}
