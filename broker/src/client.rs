//! Vault HTTP client with circuit breaker and read retries.

use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::provider::SecretsService;
use crate::secrets::{LeasedSecret, RenewResponse, SecretResponse};
use async_trait::async_trait;
use connbroker_common::{
    build_http_client, CircuitBreaker, CircuitBreakerConfig, Retryable, RetryConfig, RetryPolicy,
};
use reqwest::{Client, Method, Response};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Vault client implementing [`SecretsService`] over HTTP.
///
/// The auth token is a per-call input; the client holds no session
/// state. Every request passes through the circuit breaker; secret
/// reads additionally retry retryable failures, while revocation and
/// renewal are single-shot.
pub struct VaultClient {
    config: VaultConfig,
    http: Client,
    circuit_breaker: CircuitBreaker,
    retry: RetryPolicy,
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Http`] if the HTTP client cannot be built.
    pub fn new(config: VaultConfig) -> VaultResult<Self> {
        let http = build_http_client(&config.http)?;

        let cb_config = CircuitBreakerConfig::default()
            .with_failure_threshold(config.circuit_breaker_threshold)
            .with_timeout(config.circuit_breaker_timeout);

        let retry = RetryPolicy::new(
            RetryConfig::default()
                .with_max_retries(config.max_retries)
                .with_initial_delay(config.retry_delay),
        );

        Ok(Self {
            config,
            http,
            circuit_breaker: CircuitBreaker::new(cb_config),
            retry,
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> VaultResult<Response> {
        if !self.circuit_breaker.allow_request().await {
            warn!(path, "circuit breaker open for Vault");
            return Err(VaultError::CircuitBreakerOpen);
        }

        let result = self.do_send(method, path, token, body).await;

        match &result {
            Ok(_) => self.circuit_breaker.record_success().await,
            Err(e) if e.is_retryable() => self.circuit_breaker.record_failure().await,
            Err(_) => {}
        }

        result
    }

    async fn do_send(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> VaultResult<Response> {
        let url = format!("{}/v1/{}", self.config.addr, path);

        let mut request = self.http.request(method, &url).header("X-Vault-Token", token);

        if let Some(b) = body {
            request = request.json(&b);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VaultError::unavailable(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            404 => Err(VaultError::not_found(path)),
            403 => Err(VaultError::PermissionDenied(path.to_string())),
            429 => Err(VaultError::RateLimited),
            s if s >= 500 => {
                let text = response.text().await.unwrap_or_default();
                Err(VaultError::unavailable(format!("status {status}: {text}")))
            }
            _ if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                Err(VaultError::unavailable(format!("status {status}: {text}")))
            }
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl SecretsService for VaultClient {
    #[instrument(skip(self, token), fields(path))]
    async fn read_secret(&self, token: &str, path: &str) -> VaultResult<LeasedSecret> {
        debug!(path, "reading dynamic secret");

        let response = self
            .retry
            .execute(|| self.send(Method::GET, path, token, None))
            .await?;

        let parsed: SecretResponse = response.json().await?;
        let secret = LeasedSecret::from(parsed);

        debug!(
            lease_id = %secret.lease_id,
            ttl_secs = secret.ttl.as_secs(),
            renewable = secret.renewable,
            "dynamic secret read"
        );
        Ok(secret)
    }

    #[instrument(skip(self, token), fields(lease_id))]
    async fn revoke_lease(&self, token: &str, lease_id: &str) -> VaultResult<()> {
        let body = serde_json::json!({ "lease_id": lease_id });

        // Single-shot: a failed revocation is abandoned, never retried.
        self.send(Method::PUT, "sys/leases/revoke", token, Some(body))
            .await?;

        debug!(lease_id, "lease revoked");
        Ok(())
    }

    #[instrument(skip(self, token), fields(lease_id))]
    async fn renew_lease(
        &self,
        token: &str,
        lease_id: &str,
        increment: Duration,
    ) -> VaultResult<Duration> {
        let body = serde_json::json!({
            "lease_id": lease_id,
            "increment": increment.as_secs()
        });

        let response = self
            .send(Method::PUT, "sys/leases/renew", token, Some(body))
            .await
            .map_err(|e| VaultError::LeaseRenewalFailed(e.to_string()))?;

        let parsed: RenewResponse = response
            .json()
            .await
            .map_err(|e| VaultError::LeaseRenewalFailed(e.to_string()))?;

        debug!(
            lease_id,
            new_ttl_secs = parsed.lease_duration,
            "lease renewed"
        );
        Ok(Duration::from_secs(parsed.lease_duration))
    }
}
