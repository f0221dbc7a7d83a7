//! Credential interception: fetch, register, validate, inject.

use crate::config::SecretMapping;
use crate::connection::{AttemptId, ConnectionDescriptor};
use crate::error::{BrokerError, BrokerResult, VaultResult};
use crate::host::TokenProvider;
use crate::provider::SecretsService;
use crate::registry::{Lease, LeaseRegistry};
use crate::revoker::LeaseRevoker;
use crate::secrets::LeasedSecret;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Stateless wrapper over [`SecretsService::read_secret`].
pub struct SecretFetcher {
    service: Arc<dyn SecretsService>,
}

impl SecretFetcher {
    /// Create a fetcher over the given service.
    pub fn new(service: Arc<dyn SecretsService>) -> Self {
        Self { service }
    }

    /// Fetch the secret at `path` using `token`.
    ///
    /// # Errors
    ///
    /// Propagates the service error unchanged; no lease exists on
    /// failure.
    pub async fn fetch(&self, token: &str, path: &str) -> VaultResult<LeasedSecret> {
        debug!(path, "fetching secret");
        self.service.read_secret(token, path).await
    }
}

/// Intercepts connection attempts and injects dynamic credentials.
///
/// One call per connection-establishment attempt, from async context;
/// by the time `intercept` returns the pending lease is registered, so
/// a later connected/failed notification for the same attempt always
/// finds it.
pub struct CredentialInterceptor {
    fetcher: SecretFetcher,
    registry: Arc<LeaseRegistry>,
    revoker: Arc<LeaseRevoker>,
    tokens: Arc<dyn TokenProvider>,
}

impl CredentialInterceptor {
    /// Create an interceptor wired to the session's registry, revoker,
    /// and token source.
    pub fn new(
        service: Arc<dyn SecretsService>,
        registry: Arc<LeaseRegistry>,
        revoker: Arc<LeaseRevoker>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            fetcher: SecretFetcher::new(service),
            registry,
            revoker,
            tokens,
        }
    }

    /// Resolve the configured secret, register its lease as pending, and
    /// inject the credentials into the descriptor.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Configuration`] if a required property is
    ///   missing or empty; nothing was fetched.
    /// - [`BrokerError::Fetch`] if the token or the secret could not be
    ///   obtained; no lease exists.
    /// - [`BrokerError::MissingSecretKey`] if the secret lacks a
    ///   configured field; the just-registered lease is removed and
    ///   revoked before the error is returned.
    #[instrument(skip(self, descriptor), fields(attempt = %descriptor.attempt()))]
    pub async fn intercept(
        &self,
        mut descriptor: ConnectionDescriptor,
    ) -> BrokerResult<ConnectionDescriptor> {
        let mapping = SecretMapping::from_properties(descriptor.properties())?;

        let token = self.tokens.current_token().await.map_err(BrokerError::Fetch)?;
        let secret = self.fetcher.fetch(&token, &mapping.path).await?;

        let attempt = descriptor.attempt();
        let lease = Lease::new(
            secret.lease_id.clone(),
            mapping.path.clone(),
            secret.ttl,
            secret.renewable,
        );
        self.registry.register_pending(attempt, lease).await;

        match (
            secret.value(&mapping.username_key),
            secret.value(&mapping.password_key),
        ) {
            (Some(username), Some(password)) => {
                descriptor.set_credentials(username.expose_secret().to_string(), password.clone());
                debug!(
                    lease_id = %secret.lease_id,
                    path = %mapping.path,
                    "credentials injected"
                );
                Ok(descriptor)
            }
            (None, _) => {
                Err(self
                    .discard_unusable_secret(attempt, &mapping.username_key, &mapping.path)
                    .await)
            }
            (_, None) => {
                Err(self
                    .discard_unusable_secret(attempt, &mapping.password_key, &mapping.path)
                    .await)
            }
        }
    }

    // The fetched credential cannot be used; its lease must not leak.
    // Cleanup precedes error propagation.
    async fn discard_unusable_secret(
        &self,
        attempt: AttemptId,
        key: &str,
        path: &str,
    ) -> BrokerError {
        if let Some(lease) = self.registry.remove_pending(attempt).await {
            self.revoker.revoke(&lease).await;
        }
        BrokerError::MissingSecretKey {
            key: key.to_string(),
            path: path.to_string(),
        }
    }
}
