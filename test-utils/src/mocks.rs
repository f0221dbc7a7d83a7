//! Mock implementations of the broker's service and host contracts.

use async_trait::async_trait;
use connbroker::{LeasedSecret, Notifier, SecretsService, TokenProvider, VaultError, VaultResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory secrets service that records every call and supports
/// failure injection.
#[derive(Default)]
pub struct MockSecretsService {
    secrets: RwLock<HashMap<String, LeasedSecret>>,
    read_calls: RwLock<Vec<String>>,
    revoke_calls: RwLock<Vec<String>>,
    renew_calls: RwLock<Vec<(String, Duration)>>,
    fail_reads: AtomicBool,
    fail_revokes: AtomicBool,
    fail_renewals: AtomicBool,
}

impl MockSecretsService {
    /// Create an empty mock service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a secret at `path` for later reads.
    pub async fn set_secret(&self, path: &str, secret: LeasedSecret) {
        self.secrets.write().await.insert(path.to_string(), secret);
    }

    /// Paths of every read call made so far.
    pub async fn read_paths(&self) -> Vec<String> {
        self.read_calls.read().await.clone()
    }

    /// Number of read calls made so far.
    pub async fn read_count(&self) -> usize {
        self.read_calls.read().await.len()
    }

    /// Lease ids of every revoke call made so far, in call order.
    pub async fn revoked(&self) -> Vec<String> {
        self.revoke_calls.read().await.clone()
    }

    /// Number of revoke calls made for `lease_id`.
    pub async fn revoke_count(&self, lease_id: &str) -> usize {
        self.revoke_calls
            .read()
            .await
            .iter()
            .filter(|id| id.as_str() == lease_id)
            .count()
    }

    /// Renewal calls made so far, as (lease id, increment) pairs.
    pub async fn renewals(&self) -> Vec<(String, Duration)> {
        self.renew_calls.read().await.clone()
    }

    /// Make subsequent reads fail with an unavailable error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent revocations fail with an unavailable error.
    ///
    /// The call is still recorded before it fails.
    pub fn fail_revokes(&self, fail: bool) {
        self.fail_revokes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent renewals fail.
    pub fn fail_renewals(&self, fail: bool) {
        self.fail_renewals.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SecretsService for MockSecretsService {
    async fn read_secret(&self, _token: &str, path: &str) -> VaultResult<LeasedSecret> {
        self.read_calls.write().await.push(path.to_string());

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(VaultError::unavailable("injected read failure"));
        }

        self.secrets
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| VaultError::not_found(path))
    }

    async fn revoke_lease(&self, _token: &str, lease_id: &str) -> VaultResult<()> {
        self.revoke_calls.write().await.push(lease_id.to_string());

        if self.fail_revokes.load(Ordering::SeqCst) {
            return Err(VaultError::unavailable("injected revoke failure"));
        }

        Ok(())
    }

    async fn renew_lease(
        &self,
        _token: &str,
        lease_id: &str,
        increment: Duration,
    ) -> VaultResult<Duration> {
        self.renew_calls
            .write()
            .await
            .push((lease_id.to_string(), increment));

        if self.fail_renewals.load(Ordering::SeqCst) {
            return Err(VaultError::LeaseRenewalFailed(
                "injected renewal failure".to_string(),
            ));
        }

        Ok(increment)
    }
}

/// Token provider that always returns the same token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Create a provider returning `token` on every call.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn current_token(&self) -> VaultResult<String> {
        Ok(self.token.clone())
    }
}

/// Notifier that records every notification for later assertion.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Create an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every (title, message) pair recorded so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of notifications recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.notifications.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, title: &str, message: &str) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push((title.to_string(), message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::database_secret;

    #[tokio::test]
    async fn test_mock_service_records_reads() {
        let service = MockSecretsService::new();
        service.set_secret("secret/data/db", database_secret()).await;

        let secret = service.read_secret("token", "secret/data/db").await.unwrap();
        assert_eq!(secret.lease_id, "lease-1");
        assert_eq!(service.read_count().await, 1);

        let err = service.read_secret("token", "missing").await.unwrap_err();
        assert!(matches!(err, VaultError::SecretNotFound(_)));
        assert_eq!(service.read_paths().await, vec!["secret/data/db", "missing"]);
    }

    #[tokio::test]
    async fn test_mock_service_records_failed_revokes() {
        let service = MockSecretsService::new();
        service.fail_revokes(true);

        assert!(service.revoke_lease("token", "lease-1").await.is_err());
        assert_eq!(service.revoke_count("lease-1").await, 1);
    }

    #[tokio::test]
    async fn test_static_token_provider() {
        let provider = StaticTokenProvider::new("hvs.token");
        assert_eq!(provider.current_token().await.unwrap(), "hvs.token");
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify_error("title", "message");

        assert_eq!(notifier.count(), 1);
        assert_eq!(
            notifier.notifications(),
            vec![("title".to_string(), "message".to_string())]
        );
    }
}
