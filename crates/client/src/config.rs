//! Client configuration.
//!
//! Loaded from a TOML file and overridden by environment variables. The
//! bearer token comes from the external login flow; this crate only carries
//! it.
//!
//! # Example
//!
//! ```toml
//! [api]
//! base_url = "https://graduation.example.edu"
//! token = "eyJhbGciOi..."
//! timeout_secs = 15
//!
//! [identity]
//! role = "faculty-secretary"
//! name = "Dr. Demir"
//! ```

use std::path::{Path, PathBuf};

use gms_core::Role;
use serde::{Deserialize, Serialize};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "gms.toml";

pub const ENV_BASE_URL: &str = "GMS_API_BASE_URL";
pub const ENV_TOKEN: &str = "GMS_API_TOKEN";
pub const ENV_TIMEOUT: &str = "GMS_API_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub identity: Identity,
}

/// `[api]` section: where and how to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: Option<String>,
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: None,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// `[identity]` section: defaults for who is acting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub role: Option<Role>,
    /// Name recorded as signer in locally computed transitions.
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

impl ClientConfig {
    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration: the explicit file if given, else
    /// [`DEFAULT_CONFIG_FILE`] when it exists, else defaults. Environment
    /// variables are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => ClientConfig::from_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    ClientConfig::from_file(default)?
                } else {
                    ClientConfig::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override settings from an environment lookup.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.api.base_url = Some(url);
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.api.token = Some(token);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            self.api.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_TIMEOUT,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }
}
