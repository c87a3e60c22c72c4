//! Error types for the lifecycle engine.
//!
//! Errors are categorized so callers can decide on retry policy and on how
//! loudly to report a failure. The engine itself never retries.

use std::fmt;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of engine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed wire input or remote payload.
    Input,
    /// Configuration does not match the declared schema.
    Schema,
    /// The remote object does not exist.
    NotFound,
    /// Transient remote or transport failure (retryable).
    Network,
    /// The remote API rejected the request (validation, uniqueness, ...).
    Rejected,
    /// An engine invariant was broken. Always a defect.
    Bug,
}

impl ErrorCategory {
    /// Only network failures are worth retrying as-is.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Short human label, used as the `Display` form.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Input => "Malformed input",
            Self::Schema => "Schema violation",
            Self::NotFound => "Object not found",
            Self::Network => "Remote API unavailable",
            Self::Rejected => "Rejected by remote API",
            Self::Bug => "Internal engine error",
        }
    }

    /// What the operator should do next.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Input => "Check that the state was produced by a compatible host",
            Self::Schema => "Fix the resource configuration to match its schema",
            Self::NotFound => "The object was removed remotely; refresh and re-plan",
            Self::Network => "Check connectivity to the instance and try again",
            Self::Rejected => "Read the remote message and correct the request",
            Self::Bug => "Please report this, it indicates a defect in the engine",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The object (or endpoint) does not exist.
    NotFound,
    /// Timeouts, throttling, server errors, broken connections.
    Transient,
    /// Permanent rejection of the request.
    Rejected,
}

/// Error returned by a [`RemoteObjectClient`](crate::client::RemoteObjectClient).
///
/// `message` is the remote response text, unmodified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    /// What kind of failure this was.
    pub kind: RemoteErrorKind,
    /// HTTP status code if the failure came with one.
    pub status: Option<u16>,
    /// Remote message, verbatim.
    pub message: String,
}

impl RemoteError {
    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::NotFound,
            status: Some(404),
            message: message.into(),
        }
    }

    /// Create a transient error.
    pub fn transient(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind: RemoteErrorKind::Transient,
            status,
            message: message.into(),
        }
    }

    /// Create a permanent rejection.
    pub fn rejected(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind: RemoteErrorKind::Rejected,
            status,
            message: message.into(),
        }
    }

    /// Whether the remote reported the object as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind == RemoteErrorKind::Transient
    }
}

/// Errors that can occur while planning, applying or reading a resource.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Wire or remote payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A value cannot be represented in the wire encoding.
    #[error("encode error: {0}")]
    Encode(String),

    /// Configuration does not conform to the declared schema.
    #[error("{resource_type}: {message}")]
    SchemaViolation {
        /// Resource type being validated.
        resource_type: String,
        /// What was wrong.
        message: String,
    },

    /// No schema is registered under this resource type name.
    #[error("unknown resource type {0} - cannot find schema")]
    UnknownResourceType(String),

    /// A remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// An engine invariant was broken (e.g. an unknown value reached the remote boundary).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Create a schema violation for a resource type.
    pub fn schema(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Decode(_) | Error::Encode(_) => ErrorCategory::Input,
            Error::SchemaViolation { .. } | Error::UnknownResourceType(_) => ErrorCategory::Schema,
            Error::Remote(remote) => match remote.kind {
                RemoteErrorKind::NotFound => ErrorCategory::NotFound,
                RemoteErrorKind::Transient => ErrorCategory::Network,
                RemoteErrorKind::Rejected => ErrorCategory::Rejected,
            },
            Error::InvariantViolation(_) => ErrorCategory::Bug,
        }
    }

    /// See [`ErrorCategory::is_retryable`].
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Input.is_retryable());
        assert!(!ErrorCategory::Schema.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::Rejected.is_retryable());
        assert!(!ErrorCategory::Bug.is_retryable());
    }

    #[test]
    fn test_error_category_display() {
        let display = format!("{}", ErrorCategory::Network);
        assert!(display.contains("unavailable"));
        assert!(!ErrorCategory::Bug.advice().is_empty());
    }

    #[test]
    fn test_remote_error_categories() {
        let err: Error = RemoteError::transient("timed out", Some(503)).into();
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());

        let err: Error = RemoteError::rejected("DUPLICATE_USERNAME: Duplicate Username", Some(400)).into();
        assert_eq!(err.category(), ErrorCategory::Rejected);
        assert!(!err.is_retryable());

        let err: Error = RemoteError::not_found("gone").into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_remote_message_passes_through() {
        let body = r#"[{"message":"duplicate value found","errorCode":"DUPLICATE_VALUE"}]"#;
        let err: Error = RemoteError::rejected(body, Some(400)).into();
        assert_eq!(err.to_string(), body);
    }

    #[test]
    fn test_schema_violation_display() {
        let err = Error::schema("salesforce_user", "attribute \"alias\" is required");
        assert_eq!(err.category(), ErrorCategory::Schema);
        let display = err.to_string();
        assert!(display.contains("salesforce_user"));
        assert!(display.contains("alias"));
    }

    #[test]
    fn test_invariant_violation_is_bug() {
        let err = Error::InvariantViolation("unknown value for \"id\"".to_string());
        assert_eq!(err.category(), ErrorCategory::Bug);
    }
}
