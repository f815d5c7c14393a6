//! Profile-keyed access tokens.
//!
//! Read from `<config dir>/logicnet/credentials.toml`:
//!
//! ```toml
//! [profiles.computer]
//! token = "..."
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, Default, Deserialize)]
struct Profile {
    token: Option<String>,
}

/// Tokens keyed by profile name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

impl Credentials {
    /// Load credentials from a file. A missing file yields no credentials.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse credentials from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ServiceError::Credentials(e.to_string()))
    }

    /// Default credentials file path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ServiceError::Credentials("Cannot find config directory".into()))?;
        Ok(config_dir.join("logicnet").join("credentials.toml"))
    }

    /// Token for a profile, if any.
    pub fn token(&self, profile: &str) -> Option<&str> {
        self.profiles.get(profile)?.token.as_deref()
    }
}
