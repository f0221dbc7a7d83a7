//! Secret types: the Vault wire responses and the domain-level
//! [`LeasedSecret`] handed to the interceptor.

use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Vault dynamic-secret read response.
#[derive(Debug, Deserialize)]
pub struct SecretResponse {
    /// Lease identifier backing the returned values
    pub lease_id: String,
    /// Lease validity in seconds
    pub lease_duration: u64,
    /// Whether the lease can be renewed
    pub renewable: bool,
    /// Named secret values
    pub data: HashMap<String, String>,
}

/// Vault lease renewal response.
#[derive(Debug, Deserialize)]
pub struct RenewResponse {
    /// Lease identifier, echoed back
    pub lease_id: String,
    /// New lease validity in seconds
    pub lease_duration: u64,
    /// Whether the lease remains renewable
    pub renewable: bool,
}

/// A fetched secret bundle: named values plus the lease that backs them.
///
/// Immutable once produced; consumed exactly once by the interceptor.
/// Values are held as [`SecretString`] and never appear in `Debug`
/// output.
#[derive(Clone)]
pub struct LeasedSecret {
    values: HashMap<String, SecretString>,
    /// Lease identifier assigned by the secrets service
    pub lease_id: String,
    /// Lease validity period at issue time
    pub ttl: Duration,
    /// Whether the service allows renewing the lease
    pub renewable: bool,
}

impl LeasedSecret {
    /// Build a secret bundle from plain string values.
    #[must_use]
    pub fn new(
        values: HashMap<String, String>,
        lease_id: impl Into<String>,
        ttl: Duration,
        renewable: bool,
    ) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(key, value)| (key, SecretString::from(value)))
                .collect(),
            lease_id: lease_id.into(),
            ttl,
            renewable,
        }
    }

    /// Look up a named value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&SecretString> {
        self.values.get(key)
    }

    /// Whether the secret contains a value for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of named values in the bundle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bundle carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<SecretResponse> for LeasedSecret {
    fn from(response: SecretResponse) -> Self {
        Self::new(
            response.data,
            response.lease_id,
            Duration::from_secs(response.lease_duration),
            response.renewable,
        )
    }
}

impl fmt::Debug for LeasedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeasedSecret")
            .field("values", &"[REDACTED]")
            .field("lease_id", &self.lease_id)
            .field("ttl", &self.ttl)
            .field("renewable", &self.renewable)
            .finish()
    }
}
