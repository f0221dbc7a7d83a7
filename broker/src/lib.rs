//! Vault dynamic-credential lease broker.
//!
//! Issues short-lived, per-connection database credentials from a
//! Vault-style dynamic-secrets engine and guarantees that each issued
//! credential's backing lease is revoked exactly once: immediately when
//! the connection attempt fails, or when the established connection is
//! later closed. Multiple attempts may establish concurrently; a
//! revocation failure never propagates to the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod broker;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod host;
pub mod interceptor;
pub mod lifecycle;
pub mod provider;
pub mod registry;
pub mod revoker;
pub mod secrets;

pub use broker::CredentialBroker;
pub use client::VaultClient;
pub use config::{SecretMapping, VaultConfig};
pub use connection::{AttemptId, ConnectionDescriptor, ConnectionId};
pub use error::{BrokerError, BrokerResult, VaultError, VaultResult};
pub use host::{Notifier, TokenProvider, TracingNotifier};
pub use interceptor::{CredentialInterceptor, SecretFetcher};
pub use lifecycle::ConnectionLifecycleBridge;
pub use provider::SecretsService;
pub use registry::{Lease, LeaseRegistry};
pub use revoker::LeaseRevoker;
pub use secrets::LeasedSecret;
