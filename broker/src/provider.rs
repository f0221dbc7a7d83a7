//! The secrets-service contract consumed by the broker.

use crate::error::VaultResult;
use crate::secrets::LeasedSecret;
use async_trait::async_trait;
use std::time::Duration;

/// External secrets-service operations the broker depends on.
///
/// The auth token is a per-call input supplied by the owning session's
/// [`crate::TokenProvider`]; the service itself holds no session state.
/// Object safe so one `Arc<dyn SecretsService>` can be shared by the
/// interceptor, the revoker, and test doubles.
#[async_trait]
pub trait SecretsService: Send + Sync {
    /// Read the dynamic secret at `path`, creating a lease.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::VaultError`] on network failure, missing path,
    /// or permission problems. No lease exists when this fails.
    async fn read_secret(&self, token: &str, path: &str) -> VaultResult<LeasedSecret>;

    /// Revoke the lease with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::VaultError`] if the service rejects or cannot
    /// process the revocation.
    async fn revoke_lease(&self, token: &str, lease_id: &str) -> VaultResult<()>;

    /// Extend the lease by `increment`, returning the new validity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::VaultError::LeaseRenewalFailed`] if the service
    /// refuses the renewal.
    async fn renew_lease(
        &self,
        token: &str,
        lease_id: &str,
        increment: Duration,
    ) -> VaultResult<Duration>;
}
