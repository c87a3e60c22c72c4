//! Error types for the sObject client.
//!
//! Remote failures are reported as [`RemoteError`] so the engine can tell a
//! missing object from a throttled or rejected request. This module maps
//! HTTP statuses and `ureq` transport failures onto those kinds.

use declarative::RemoteError;
use thiserror::Error;

/// Invalid connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting is empty.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// The instance URL is not an absolute http(s) URL.
    #[error("instance_url must start with https:// or http://, got {0:?}")]
    InvalidInstanceUrl(String),
}

/// Classify an HTTP error status. `body` is passed through untouched.
///
/// | Status              | Kind        |
/// |---------------------|-------------|
/// | 404                 | `NotFound`  |
/// | 408, 429, 5xx       | `Transient` |
/// | any other 4xx       | `Rejected`  |
pub fn from_status(status: u16, body: String) -> RemoteError {
    match status {
        404 => RemoteError::not_found(body),
        408 | 429 | 500..=599 => RemoteError::transient(body, Some(status)),
        _ => RemoteError::rejected(body, Some(status)),
    }
}

/// Classify a `ureq` failure that carries no usable response.
pub fn from_transport(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::StatusCode(code) => from_status(code, format!("HTTP {code}")),
        ureq::Error::BadUri(uri) => RemoteError::rejected(format!("bad request URI: {uri}"), None),
        ureq::Error::Json(e) => RemoteError::rejected(format!("unexpected response body: {e}"), None),
        other => RemoteError::transient(other.to_string(), None),
    }
}
