//! Client configuration and the per-profile secret mapping.

use crate::error::{BrokerError, BrokerResult};
use connbroker_common::HttpConfig;
use std::collections::HashMap;
use std::time::Duration;

/// Connection property naming the secret path.
pub const SECRET_PATH_PROPERTY: &str = "secret.path";
/// Connection property naming the secret field holding the username.
pub const USERNAME_KEY_PROPERTY: &str = "secret.usernameKey";
/// Connection property naming the secret field holding the password.
pub const PASSWORD_KEY_PROPERTY: &str = "secret.passwordKey";

/// Vault client configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address
    pub addr: String,
    /// HTTP client settings
    pub http: HttpConfig,
    /// Maximum retry attempts for secret reads
    pub max_retries: u32,
    /// Base retry delay
    pub retry_delay: Duration,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout
    pub circuit_breaker_timeout: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: std::env::var("VAULT_ADDR")
                .unwrap_or_else(|_| "https://vault.vault.svc:8200".to_string()),
            http: HttpConfig::default(),
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
            circuit_breaker_threshold: 5,
            circuit_breaker_timeout: Duration::from_secs(30),
        }
    }
}

impl VaultConfig {
    /// Create a new configuration for the given server address.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    /// Set maximum retry attempts for secret reads.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set base retry delay.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set circuit breaker failure threshold.
    #[must_use]
    pub const fn with_circuit_breaker_threshold(mut self, threshold: u32) -> Self {
        self.circuit_breaker_threshold = threshold;
        self
    }

    /// Set circuit breaker reset timeout.
    #[must_use]
    pub const fn with_circuit_breaker_timeout(mut self, timeout: Duration) -> Self {
        self.circuit_breaker_timeout = timeout;
        self
    }
}

/// The three required per-profile properties resolved from a
/// connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMapping {
    /// Path of the dynamic secret in the secrets service
    pub path: String,
    /// Field name within the secret holding the username
    pub username_key: String,
    /// Field name within the secret holding the password
    pub password_key: String,
}

impl SecretMapping {
    /// Resolve the mapping from a descriptor's property map.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Configuration`] naming the first property
    /// that is missing or empty.
    pub fn from_properties(properties: &HashMap<String, String>) -> BrokerResult<Self> {
        Ok(Self {
            path: required(properties, SECRET_PATH_PROPERTY)?,
            username_key: required(properties, USERNAME_KEY_PROPERTY)?,
            password_key: required(properties, PASSWORD_KEY_PROPERTY)?,
        })
    }
}

fn required(properties: &HashMap<String, String>, key: &str) -> BrokerResult<String> {
    match properties.get(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(BrokerError::Configuration {
            key: key.to_string(),
        }),
    }
}
