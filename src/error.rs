//! Error types for the ringpool library

use thiserror::Error;

/// Result type alias for ringpool operations
pub type Result<T> = std::result::Result<T, RingPoolError>;

/// Main error type for the ringpool library
#[derive(Error, Debug)]
pub enum RingPoolError {
    /// Invalid configuration parameter supplied to a constructor
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl RingPoolError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}
