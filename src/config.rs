//! Configuration file support for taxicheck
//!
//! Reads configuration from `~/.config/taxicheck/config.json`:
//!
//! ```json
//! {
//!   "base_url": "https://taxi-nextjs.preview.emergentagent.com/api",
//!   "admin_username": "admin",
//!   "admin_password": "TaxiTurlihof2025!",
//!   "thresholds": {
//!     "routes": 0.8
//!   }
//! }
//! ```
//!
//! Every field is optional; a missing file means built-in defaults.

use crate::cli::Suite;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Default backend preview deployment exercised by the suites
pub const DEFAULT_BASE_URL: &str = "https://taxi-nextjs.preview.emergentagent.com/api";

/// Default admin credentials seeded in the backend
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "TaxiTurlihof2025!";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine config directory. HOME environment variable not set.")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Backend base URL (default: the preview deployment)
    pub base_url: Option<String>,

    /// Admin username for authenticated suites
    pub admin_username: Option<String>,

    /// Admin password for authenticated suites
    pub admin_password: Option<String>,

    /// Per-suite pass-rate gate overrides, keyed by suite name
    #[serde(default)]
    pub thresholds: HashMap<String, f64>,
}

impl Config {
    /// Load configuration from the default path or return defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::ParseError { path, source })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn admin_username(&self) -> &str {
        self.admin_username
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_USERNAME)
    }

    pub fn admin_password(&self) -> &str {
        self.admin_password
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_PASSWORD)
    }

    /// Pass-rate gate for a suite: config override, else the suite default
    pub fn threshold(&self, suite: Suite) -> f64 {
        self.thresholds
            .get(&suite.to_string())
            .copied()
            .unwrap_or_else(|| suite.default_threshold())
    }
}

/// Returns the config file path: `~/.config/taxicheck/config.json`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".config"))
                .unwrap_or_default()
        });

    if config_base.as_os_str().is_empty() {
        return Err(ConfigError::NoConfigDir);
    }

    Ok(config_base.join("taxicheck").join("config.json"))
}
