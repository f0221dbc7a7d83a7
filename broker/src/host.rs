//! Contracts the owning session/host supplies to the broker.

use crate::error::VaultResult;
use async_trait::async_trait;
use tracing::warn;

/// Source of the session's current auth token.
///
/// External collaborator; assumed safe for concurrent calls. Token
/// acquisition and refresh policy live behind this trait and are not the
/// broker's concern.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// The auth token to present to the secrets service right now.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::VaultError`] if no token can be produced.
    async fn current_token(&self) -> VaultResult<String>;
}

/// Non-blocking sink for user-facing error notifications.
///
/// Used for failures that must not propagate, most notably lease
/// revocation errors.
pub trait Notifier: Send + Sync {
    /// Report an error to the user without blocking the caller.
    fn notify_error(&self, title: &str, message: &str);
}

/// Default [`Notifier`] that routes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, title: &str, message: &str) {
        warn!(%title, %message, "user-facing error notification");
    }
}
