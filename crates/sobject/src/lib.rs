//! # sobject
//!
//! Blocking client for the Salesforce sObject REST API, implementing
//! [`declarative::RemoteObjectClient`].
//!
//! - Object URLs are discovered through the global describe and cached
//! - Requests carry the access token as a bearer token
//! - Failures are classified into not-found, transient and rejected, with
//!   the response body passed through verbatim
//!
//! Nothing here retries; the caller decides based on
//! [`declarative::RemoteError::is_retryable`].

#![warn(missing_docs)]

pub mod client;
pub mod connection;
mod describe;
pub mod error;

pub use client::ForceClient;
pub use connection::{Connection, DEFAULT_API_VERSION, DEFAULT_TIMEOUT};
pub use error::ConfigError;
