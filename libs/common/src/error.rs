//! Custom error types for the common library
//!
//! This module defines the errors raised while loading configuration and
//! while talking to the VCMS backend.

use thiserror::Error;

/// Error raised by a single fetch against the VCMS backend
///
/// Carried inside poll snapshots, so it is `Clone` and holds rendered
/// messages rather than the underlying transport errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The backend answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The request never produced a response (connect, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request URL could not be built from the base URL and key
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// HTTP status reported by the backend, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Type alias for Result with FetchError
pub type FetchResult<T> = Result<T, FetchError>;

/// Error raised while building the runtime configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration sources could not be read or deserialized
    #[error("Configuration load error: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not usable
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// The HTTP client could not be built from the configuration
    #[error("HTTP client construction error: {0}")]
    Client(#[source] reqwest::Error),
}

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
