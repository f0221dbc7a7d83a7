//! Common error types shared by the connbroker crates.
//!
//! Every error in the workspace is classified as retryable or not, which
//! lets the retry and circuit-breaker layers decide uniformly whether a
//! failed call is worth repeating.

use thiserror::Error;

/// Classification of errors into transient and permanent failures.
///
/// Implemented by every error type that flows through [`crate::RetryPolicy`].
pub trait Retryable {
    /// Whether a failed operation may succeed if repeated.
    fn is_retryable(&self) -> bool;
}

/// Common error type for platform-level operations.
#[derive(Error, Debug)]
pub enum CommonError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Circuit breaker is open for the specified service
    #[error("Circuit breaker open for {service}")]
    CircuitOpen {
        /// The service name that has an open circuit
        service: String,
    },

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limited")]
    RateLimited,

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout occurred
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CommonError {
    /// Create a circuit open error for the given service.
    #[must_use]
    pub fn circuit_open(service: impl Into<String>) -> Self {
        Self::CircuitOpen {
            service: service.into(),
        }
    }

    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl Retryable for CommonError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::RateLimited | Self::Timeout(_)
        )
    }
}
