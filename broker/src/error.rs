//! Error types for the lease broker.
//!
//! Two taxonomies live here: [`VaultError`] covers the secrets-service
//! client (wire failures, permission problems, circuit breaker), and
//! [`BrokerError`] covers the credential lifecycle (configuration,
//! fetch, key validation, registry invariants). Revocation failures are
//! deliberately absent from both surfaces: they are reported through the
//! [`crate::Notifier`] and swallowed.

use crate::connection::AttemptId;
use connbroker_common::{CommonError, Retryable};
use thiserror::Error;

/// Secrets-service client errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Vault server unavailable
    #[error("Vault unavailable: {0}")]
    Unavailable(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Secret not found
    #[error("Secret not found at path: {0}")]
    SecretNotFound(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Rate limited
    #[error("Rate limited")]
    RateLimited,

    /// Lease renewal failed
    #[error("Lease renewal failed: {0}")]
    LeaseRenewalFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Circuit breaker open
    #[error("Circuit breaker open")]
    CircuitBreakerOpen,

    /// Platform common error
    #[error(transparent)]
    Common(#[from] CommonError),
}

/// Result type for secrets-service operations.
pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an authentication failed error.
    #[must_use]
    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::AuthenticationFailed(msg.into())
    }

    /// Create a secret not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::SecretNotFound(path.into())
    }
}

impl Retryable for VaultError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::RateLimited | Self::Http(_)
        )
    }
}

/// Credential lifecycle errors surfaced to the host at connection time.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// A required connection property is missing or empty
    #[error("Required connection property '{key}' is missing or empty")]
    Configuration {
        /// The property that failed validation
        key: String,
    },

    /// The secrets-service fetch failed; no lease was created
    #[error("Failed to fetch secret: {0}")]
    Fetch(#[from] VaultError),

    /// The fetched secret lacks a configured field; its lease has been revoked
    #[error("Secret at '{path}' does not contain key '{key}'")]
    MissingSecretKey {
        /// The configured field name that was absent
        key: String,
        /// The secret path the fetch was made against
        path: String,
    },

    /// A connected notification arrived with no pending lease registered.
    ///
    /// This indicates a lost lease and is a defect in the caller's event
    /// ordering, not a recoverable condition.
    #[error("No pending lease registered for connection attempt {attempt}")]
    NoPendingLease {
        /// The attempt the notification referred to
        attempt: AttemptId,
    },
}

/// Result type for lifecycle operations.
pub type BrokerResult<T> = Result<T, BrokerError>;
