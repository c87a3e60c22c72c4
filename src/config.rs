//! Provider configuration
//!
//! Settings come from `config.toml` in the config directory (see
//! [`crate::paths`]) and can be overridden per setting by environment
//! variables:
//!
//! ```toml
//! instance_url = "https://example.my.salesforce.com"
//! api_version = "53.0"
//! access_token = "00D..."
//! timeout_secs = 30
//! ```

use crate::paths;
use anyhow::{Context, Result};
use serde::Deserialize;
use sobject::{ConfigError, Connection, DEFAULT_API_VERSION, DEFAULT_TIMEOUT};
use std::path::Path;
use std::time::Duration;

pub const ENV_INSTANCE_URL: &str = "SALESFORCE_INSTANCE_URL";
pub const ENV_API_VERSION: &str = "SALESFORCE_API_VERSION";
pub const ENV_ACCESS_TOKEN: &str = "SALESFORCE_ACCESS_TOKEN";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub instance_url: Option<String>,
    pub api_version: Option<String>,
    pub access_token: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file means "no file
    /// settings" so the environment alone can configure the provider.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (paths::config_file()?, false),
        };

        if !explicit && !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format in provider config")
    }

    /// Apply `SALESFORCE_*` overrides from the process environment
    pub fn with_process_env(self) -> Self {
        self.with_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides, looking each variable up with `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(url) = set(ENV_INSTANCE_URL) {
            log::debug!("Using instance_url from {ENV_INSTANCE_URL}");
            self.instance_url = Some(url);
        }
        if let Some(version) = set(ENV_API_VERSION) {
            log::debug!("Using api_version from {ENV_API_VERSION}");
            self.api_version = Some(version);
        }
        if let Some(token) = set(ENV_ACCESS_TOKEN) {
            log::debug!("Using access_token from {ENV_ACCESS_TOKEN}");
            self.access_token = Some(token);
        }
        self
    }

    /// Connection settings, with defaults filled in and validated
    pub fn connection(&self) -> std::result::Result<Connection, ConfigError> {
        let conn = Connection::new(
            self.instance_url.clone().unwrap_or_default(),
            self.access_token.clone().unwrap_or_default(),
        )
        .api_version(
            self.api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        )
        .timeout(self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs));
        conn.validate()?;
        Ok(conn)
    }
}
