//! Session-scoped lease registry.
//!
//! Two tables track every live lease: `pending` keys leases by the
//! connection attempt that fetched them, `active` keys leases by the
//! established connection that owns them. Both sit behind a single mutex
//! so registration, transfer, and removal are atomic with respect to
//! each other; a lease is never visible in both tables, or in neither,
//! between transitions. The lock is never held across remote calls.

use crate::connection::{AttemptId, ConnectionId};
use crate::error::{BrokerError, BrokerResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// A claim on a revocable credential issued by the secrets service.
///
/// Exactly one terminal action applies over a lease's lifetime: revoke.
/// The registry's exactly-once removal semantics enforce it.
#[derive(Debug, Clone)]
pub struct Lease {
    /// Lease identifier assigned by the secrets service
    pub lease_id: String,
    /// Secret path the lease was issued for
    pub path: String,
    /// When the secret was fetched
    pub issued_at: DateTime<Utc>,
    /// Lease validity period at issue time
    pub ttl: Duration,
    /// Whether the service allows renewing this lease
    pub renewable: bool,
}

impl Lease {
    /// Create a lease record for a freshly fetched secret.
    #[must_use]
    pub fn new(
        lease_id: impl Into<String>,
        path: impl Into<String>,
        ttl: Duration,
        renewable: bool,
    ) -> Self {
        Self {
            lease_id: lease_id.into(),
            path: path.into(),
            issued_at: Utc::now(),
            ttl,
            renewable,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    pending: HashMap<AttemptId, Lease>,
    active: HashMap<ConnectionId, Lease>,
}

/// Registry mapping in-flight attempts and established connections to
/// their leases.
///
/// One instance is constructed per session and passed explicitly to
/// every component that needs it.
#[derive(Debug, Default)]
pub struct LeaseRegistry {
    tables: Mutex<Tables>,
}

impl LeaseRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly issued lease for an in-flight connection attempt.
    ///
    /// Attempt ids are unique per attempt, so an existing pending entry
    /// for the same key means a lease was lost; the overwrite is logged
    /// loudly.
    pub async fn register_pending(&self, attempt: AttemptId, lease: Lease) {
        let mut tables = self.tables.lock().await;
        debug!(%attempt, lease_id = %lease.lease_id, "registering pending lease");
        if let Some(previous) = tables.pending.insert(attempt, lease) {
            error!(
                %attempt,
                lease_id = %previous.lease_id,
                "pending lease overwritten for live attempt; the previous lease is lost"
            );
        }
    }

    /// Bind the pending lease for `attempt` to an established connection.
    ///
    /// The pending entry is removed and the lease inserted into the
    /// active table in one locked step.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::NoPendingLease`] if no lease is registered
    /// for `attempt`. That only happens when event ordering is broken
    /// and indicates a lost lease.
    pub async fn transfer_to_active(
        &self,
        attempt: AttemptId,
        connection: ConnectionId,
    ) -> BrokerResult<Lease> {
        let mut tables = self.tables.lock().await;
        let Some(lease) = tables.pending.remove(&attempt) else {
            error!(%attempt, "connected notification with no pending lease");
            return Err(BrokerError::NoPendingLease { attempt });
        };
        debug!(
            %attempt,
            %connection,
            lease_id = %lease.lease_id,
            "lease transferred to active connection"
        );
        if let Some(previous) = tables.active.insert(connection, lease.clone()) {
            error!(
                %connection,
                lease_id = %previous.lease_id,
                "active lease overwritten for live connection; the previous lease is lost"
            );
        }
        Ok(lease)
    }

    /// Remove and return the pending lease for `attempt` without
    /// transferring it. Used when the connection attempt fails.
    pub async fn remove_pending(&self, attempt: AttemptId) -> Option<Lease> {
        self.tables.lock().await.pending.remove(&attempt)
    }

    /// Remove and return the active lease for `connection`.
    ///
    /// `None` means the connection never carried a dynamic-secret lease
    /// (e.g. it used a different auth method) and the close is a no-op.
    pub async fn remove_active(&self, connection: ConnectionId) -> Option<Lease> {
        self.tables.lock().await.active.remove(&connection)
    }

    /// The active lease for `connection`, if any, without removing it.
    pub async fn active(&self, connection: ConnectionId) -> Option<Lease> {
        self.tables.lock().await.active.get(&connection).cloned()
    }

    /// Empty both tables, returning every lease still tracked.
    ///
    /// Used at session teardown so no lease outlives the session.
    pub async fn drain(&self) -> Vec<Lease> {
        let mut tables = self.tables.lock().await;
        let mut leases: Vec<Lease> = tables.pending.drain().map(|(_, lease)| lease).collect();
        leases.extend(tables.active.drain().map(|(_, lease)| lease));
        leases
    }

    /// Number of pending leases.
    pub async fn pending_len(&self) -> usize {
        self.tables.lock().await.pending.len()
    }

    /// Number of active leases.
    pub async fn active_len(&self) -> usize {
        self.tables.lock().await.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lease(id: &str) -> Lease {
        Lease::new(id, "secret/data/db", Duration::from_secs(3600), true)
    }

    #[tokio::test]
    async fn test_register_and_transfer() {
        let registry = LeaseRegistry::new();
        let attempt = AttemptId::new();
        let connection = ConnectionId::new();

        registry.register_pending(attempt, lease("lease-1")).await;
        assert_eq!(registry.pending_len().await, 1);
        assert_eq!(registry.active_len().await, 0);

        let transferred = registry.transfer_to_active(attempt, connection).await.unwrap();
        assert_eq!(transferred.lease_id, "lease-1");
        assert_eq!(registry.pending_len().await, 0);
        assert_eq!(registry.active_len().await, 1);
    }

    #[tokio::test]
    async fn test_transfer_without_pending_is_a_defect() {
        let registry = LeaseRegistry::new();
        let attempt = AttemptId::new();

        let err = registry
            .transfer_to_active(attempt, ConnectionId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::NoPendingLease { attempt: a } if a == attempt));
    }

    #[tokio::test]
    async fn test_remove_pending_consumes_entry() {
        let registry = LeaseRegistry::new();
        let attempt = AttemptId::new();

        registry.register_pending(attempt, lease("lease-1")).await;

        let removed = registry.remove_pending(attempt).await.unwrap();
        assert_eq!(removed.lease_id, "lease-1");
        assert!(registry.remove_pending(attempt).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_active_is_none_for_untracked_connection() {
        let registry = LeaseRegistry::new();
        assert!(registry.remove_active(ConnectionId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_active_consumes_entry() {
        let registry = LeaseRegistry::new();
        let attempt = AttemptId::new();
        let connection = ConnectionId::new();

        registry.register_pending(attempt, lease("lease-1")).await;
        registry.transfer_to_active(attempt, connection).await.unwrap();

        assert_eq!(
            registry.remove_active(connection).await.unwrap().lease_id,
            "lease-1"
        );
        assert!(registry.remove_active(connection).await.is_none());
    }

    #[tokio::test]
    async fn test_distinct_attempts_do_not_interfere() {
        let registry = LeaseRegistry::new();
        let first = AttemptId::new();
        let second = AttemptId::new();

        registry.register_pending(first, lease("lease-1")).await;
        registry.register_pending(second, lease("lease-2")).await;

        assert_eq!(registry.remove_pending(first).await.unwrap().lease_id, "lease-1");
        assert_eq!(registry.remove_pending(second).await.unwrap().lease_id, "lease-2");
    }

    #[tokio::test]
    async fn test_drain_empties_both_tables() {
        let registry = LeaseRegistry::new();
        let pending_attempt = AttemptId::new();
        let transferred_attempt = AttemptId::new();
        let connection = ConnectionId::new();

        registry.register_pending(pending_attempt, lease("lease-1")).await;
        registry.register_pending(transferred_attempt, lease("lease-2")).await;
        registry
            .transfer_to_active(transferred_attempt, connection)
            .await
            .unwrap();

        let mut drained: Vec<String> = registry
            .drain()
            .await
            .into_iter()
            .map(|l| l.lease_id)
            .collect();
        drained.sort();

        assert_eq!(drained, vec!["lease-1", "lease-2"]);
        assert_eq!(registry.pending_len().await, 0);
        assert_eq!(registry.active_len().await, 0);
    }
}
