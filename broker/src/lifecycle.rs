//! Bridge from host connection-lifecycle notifications to lease
//! transitions.

use crate::connection::{AttemptId, ConnectionId};
use crate::error::BrokerResult;
use crate::registry::LeaseRegistry;
use crate::revoker::LeaseRevoker;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Drives registry and revoker transitions from the three
/// host-originated events: connected, connection failed, connection
/// closed.
///
/// The host guarantees that `intercept` has fully completed for an
/// attempt before either `connected` or `connection_failed` is
/// delivered for it.
pub struct ConnectionLifecycleBridge {
    registry: Arc<LeaseRegistry>,
    revoker: Arc<LeaseRevoker>,
}

impl ConnectionLifecycleBridge {
    /// Create a bridge over the session's registry and revoker.
    pub fn new(registry: Arc<LeaseRegistry>, revoker: Arc<LeaseRevoker>) -> Self {
        Self { registry, revoker }
    }

    /// The attempt established a connection: bind its pending lease to
    /// the connection for the connection's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BrokerError::NoPendingLease`] if no lease is
    /// pending for `attempt` — an event-ordering defect, logged loudly
    /// by the registry.
    #[instrument(skip(self))]
    pub async fn connected(
        &self,
        attempt: AttemptId,
        connection: ConnectionId,
    ) -> BrokerResult<()> {
        let lease = self.registry.transfer_to_active(attempt, connection).await?;
        debug!(lease_id = %lease.lease_id, "connection established, lease held");
        Ok(())
    }

    /// The attempt failed: remove its pending lease and revoke it
    /// immediately. A missing pending entry is a no-op — the fetch may
    /// have failed before any lease existed.
    #[instrument(skip(self))]
    pub async fn connection_failed(&self, attempt: AttemptId) {
        match self.registry.remove_pending(attempt).await {
            Some(lease) => self.revoker.revoke(&lease).await,
            None => debug!("failed attempt carried no pending lease"),
        }
    }

    /// The connection closed: remove its active lease, if any, and
    /// revoke it. Connections that never carried a dynamic-secret lease
    /// are a no-op.
    #[instrument(skip(self))]
    pub async fn connection_closed(&self, connection: ConnectionId) {
        match self.registry.remove_active(connection).await {
            Some(lease) => self.revoker.revoke(&lease).await,
            None => debug!("closed connection carried no lease"),
        }
    }
}
