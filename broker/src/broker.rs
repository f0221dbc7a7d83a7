//! Session facade wiring the broker components together.

use crate::connection::{AttemptId, ConnectionDescriptor, ConnectionId};
use crate::error::{BrokerError, BrokerResult};
use crate::host::{Notifier, TokenProvider};
use crate::interceptor::CredentialInterceptor;
use crate::lifecycle::ConnectionLifecycleBridge;
use crate::provider::SecretsService;
use crate::registry::LeaseRegistry;
use crate::revoker::LeaseRevoker;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One broker per logical session/project.
///
/// Explicitly constructed with the session's secrets service, token
/// source, and notification sink; owns the registry and hands it to the
/// interceptor and the lifecycle bridge. No ambient singletons.
pub struct CredentialBroker {
    service: Arc<dyn SecretsService>,
    tokens: Arc<dyn TokenProvider>,
    registry: Arc<LeaseRegistry>,
    revoker: Arc<LeaseRevoker>,
    interceptor: CredentialInterceptor,
    bridge: ConnectionLifecycleBridge,
}

impl CredentialBroker {
    /// Wire a broker for one session.
    pub fn new(
        service: Arc<dyn SecretsService>,
        tokens: Arc<dyn TokenProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let registry = Arc::new(LeaseRegistry::new());
        let revoker = Arc::new(LeaseRevoker::new(
            Arc::clone(&service),
            Arc::clone(&tokens),
            notifier,
        ));
        let interceptor = CredentialInterceptor::new(
            Arc::clone(&service),
            Arc::clone(&registry),
            Arc::clone(&revoker),
            Arc::clone(&tokens),
        );
        let bridge =
            ConnectionLifecycleBridge::new(Arc::clone(&registry), Arc::clone(&revoker));

        Self {
            service,
            tokens,
            registry,
            revoker,
            interceptor,
            bridge,
        }
    }

    /// The session's lease registry, for observation.
    #[must_use]
    pub fn registry(&self) -> &LeaseRegistry {
        &self.registry
    }

    /// Intercept a connection attempt: fetch the configured secret,
    /// register its lease, and inject the credentials.
    ///
    /// # Errors
    ///
    /// See [`CredentialInterceptor::intercept`].
    pub async fn intercept(
        &self,
        descriptor: ConnectionDescriptor,
    ) -> BrokerResult<ConnectionDescriptor> {
        self.interceptor.intercept(descriptor).await
    }

    /// Host notification: the attempt established a connection.
    ///
    /// # Errors
    ///
    /// See [`ConnectionLifecycleBridge::connected`].
    pub async fn connected(
        &self,
        attempt: AttemptId,
        connection: ConnectionId,
    ) -> BrokerResult<()> {
        self.bridge.connected(attempt, connection).await
    }

    /// Host notification: the attempt failed to connect.
    pub async fn connection_failed(&self, attempt: AttemptId) {
        self.bridge.connection_failed(attempt).await;
    }

    /// Host notification: an established connection closed.
    pub async fn connection_closed(&self, connection: ConnectionId) {
        self.bridge.connection_closed(connection).await;
    }

    /// Extend the lease of an established connection by `increment`.
    ///
    /// Returns the new validity, or `None` when the connection carries
    /// no lease or its lease is not renewable. Renewal never changes
    /// lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Fetch`] if the token or the renewal call
    /// fails; the lease stays active either way.
    pub async fn renew_active(
        &self,
        connection: ConnectionId,
        increment: Duration,
    ) -> BrokerResult<Option<Duration>> {
        let Some(lease) = self.registry.active(connection).await else {
            return Ok(None);
        };
        if !lease.renewable {
            debug!(lease_id = %lease.lease_id, "lease is not renewable, skipping");
            return Ok(None);
        }

        let token = self.tokens.current_token().await.map_err(BrokerError::Fetch)?;
        let ttl = self
            .service
            .renew_lease(&token, &lease.lease_id, increment)
            .await
            .map_err(BrokerError::Fetch)?;

        debug!(
            lease_id = %lease.lease_id,
            new_ttl_secs = ttl.as_secs(),
            "active lease renewed"
        );
        Ok(Some(ttl))
    }

    /// Tear the session down: revoke every lease still tracked, pending
    /// or active, and leave the registry empty.
    pub async fn shutdown(&self) {
        let leases = self.registry.drain().await;
        if leases.is_empty() {
            return;
        }

        info!(count = leases.len(), "revoking remaining leases on shutdown");
        for lease in leases {
            self.revoker.revoke(&lease).await;
        }
    }
}
