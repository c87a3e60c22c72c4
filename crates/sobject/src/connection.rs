//! Connection settings for an org.

use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

/// REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "53.0";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to reach one org.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection {
    /// Org base URL, e.g. `https://example.my.salesforce.com`
    pub instance_url: String,
    /// REST API version without the `v` prefix, e.g. `53.0`
    pub api_version: String,
    /// OAuth access token, sent as a bearer token
    pub access_token: String,
    /// Global per-request timeout
    pub timeout: Duration,
}

impl Connection {
    /// Create settings with the default API version and timeout.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different REST API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Use a different request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that every setting is present and the URL is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instance_url.trim().is_empty() {
            return Err(ConfigError::Missing("instance_url"));
        }
        if self.api_version.trim().is_empty() {
            return Err(ConfigError::Missing("api_version"));
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::Missing("access_token"));
        }
        if !self.instance_url.starts_with("https://") && !self.instance_url.starts_with("http://") {
            return Err(ConfigError::InvalidInstanceUrl(self.instance_url.clone()));
        }
        Ok(())
    }

    /// Instance URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.instance_url.trim_end_matches('/')
    }

    /// URL of the global describe endpoint
    pub fn describe_url(&self) -> String {
        format!("{}/services/data/v{}/sobjects", self.base_url(), self.api_version)
    }

    /// URL of the SOQL query endpoint
    pub fn query_url(&self) -> String {
        format!("{}/services/data/v{}/query", self.base_url(), self.api_version)
    }

    /// Resolve a server-relative path returned by describe
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{path}", self.base_url())
        }
    }
}

// The token never appears in logs or debug output.
impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("instance_url", &self.instance_url)
            .field("api_version", &self.api_version)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
