//! Error types for ESD

use std::time::Duration;
use thiserror::Error;

/// Result type alias for ESD operations
pub type Result<T> = std::result::Result<T, EsdError>;

/// Main error type for ESD operations
#[derive(Error, Debug)]
pub enum EsdError {
    /// Fatal configuration error (e.g. missing servers.esd)
    #[error("configuration error: {0}")]
    Config(String),

    /// Resolver pool setup failed (bad resolver address, etc.)
    #[error("DNS resolution failed: {0}")]
    Resolve(String),

    /// Query timed out
    #[error("DNS query timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid input (domain, resolver address, template line)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl EsdError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn resolve(msg: impl Into<String>) -> Self {
        Self::Resolve(msg.into())
    }

    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout(duration)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
