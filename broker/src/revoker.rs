//! Lease revocation with swallow-and-notify error handling.

use crate::host::{Notifier, TokenProvider};
use crate::provider::SecretsService;
use crate::registry::Lease;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Revokes leases against the secrets service.
///
/// A revocation failure is reported through the [`Notifier`] and
/// swallowed: connection teardown must never fail or block because the
/// service could not be reached. The caller guarantees at most one
/// `revoke` per lease via the registry's exactly-once removal.
pub struct LeaseRevoker {
    service: Arc<dyn SecretsService>,
    tokens: Arc<dyn TokenProvider>,
    notifier: Arc<dyn Notifier>,
}

impl LeaseRevoker {
    /// Create a revoker for the given service, token source, and
    /// notification sink.
    pub fn new(
        service: Arc<dyn SecretsService>,
        tokens: Arc<dyn TokenProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            service,
            tokens,
            notifier,
        }
    }

    /// Revoke `lease`, acquiring a fresh token from the owning session.
    ///
    /// Never fails from the caller's point of view; on error the lease
    /// is abandoned on the service side.
    #[instrument(skip(self, lease), fields(lease_id = %lease.lease_id))]
    pub async fn revoke(&self, lease: &Lease) {
        let token = match self.tokens.current_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not obtain token to revoke lease");
                self.notifier.notify_error(
                    "Lease revocation failed",
                    &format!(
                        "Could not obtain a Vault token to revoke lease {}: {e}",
                        lease.lease_id
                    ),
                );
                return;
            }
        };

        match self.service.revoke_lease(&token, &lease.lease_id).await {
            Ok(()) => debug!(path = %lease.path, "lease revoked"),
            Err(e) => {
                warn!(error = %e, path = %lease.path, "lease revocation failed");
                self.notifier.notify_error(
                    "Lease revocation failed",
                    &format!("Vault reported an error revoking lease {}: {e}", lease.lease_id),
                );
            }
        }
    }
}
