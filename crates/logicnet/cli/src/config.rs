//! CLI configuration
//!
//! ```toml
//! backend = "http"
//! name = "computer"
//! settle_ms = 1000
//!
//! [service]
//! endpoint = "http://localhost:8080"
//! region = "eu-west-1"
//! profile = "computer"
//!
//! [service.headers]
//! x-tenant = "lab"
//! ```

use crate::error::{CliError, CliResult};
use logicnet_service::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where rule nodes live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Remote service over HTTP
    #[default]
    Http,
    /// In-process service, gone when the command exits
    Memory,
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Default backend
    pub backend: Option<Backend>,

    /// Default circuit name
    pub name: Option<String>,

    /// Settle delay and retry backoff in milliseconds
    pub settle_ms: Option<u64>,

    /// Rule service connection
    #[serde(default)]
    pub service: ServiceConfig,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::parse(&contents)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn parse(contents: &str) -> CliResult<Self> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("logicnet").join("config.toml"))
    }
}
