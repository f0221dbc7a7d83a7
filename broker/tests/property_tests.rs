//! Property-based tests for the lease lifecycle.
//!
//! The central invariant under test: for every lease ever created,
//! revoke is called exactly once, regardless of which path the
//! connection takes through the state machine.

use connbroker::{BrokerError, ConnectionDescriptor, ConnectionId, CredentialBroker, LeasedSecret};
use proptest::prelude::*;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::Arc;
use test_utils::generators::{
    key_name_strategy, lease_id_strategy, secret_path_strategy, secret_value_strategy,
    ttl_strategy, username_strategy,
};
use test_utils::mocks::{MockSecretsService, RecordingNotifier, StaticTokenProvider};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
}

fn broker_with(service: &Arc<MockSecretsService>) -> CredentialBroker {
    let service: Arc<dyn connbroker::SecretsService> = Arc::<MockSecretsService>::clone(service);
    CredentialBroker::new(
        service,
        Arc::new(StaticTokenProvider::new("hvs.test")),
        Arc::new(RecordingNotifier::new()),
    )
}

fn descriptor_for(path: &str, username_key: &str, password_key: &str) -> ConnectionDescriptor {
    ConnectionDescriptor::new()
        .with_property("secret.path", path)
        .with_property("secret.usernameKey", username_key)
        .with_property("secret.passwordKey", password_key)
}

// Distinct field names so the username and password keys never collide.
fn key_pair_strategy() -> impl Strategy<Value = (String, String)> {
    key_name_strategy().prop_map(|base| (format!("u_{base}"), format!("p_{base}")))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any secret containing both configured keys, intercept
    /// succeeds, injects exactly the secret's values, and registers
    /// exactly one pending lease.
    #[test]
    fn prop_injected_credentials_match_secret(
        path in secret_path_strategy(),
        (username_key, password_key) in key_pair_strategy(),
        username in username_strategy(),
        password in secret_value_strategy(),
        lease_id in lease_id_strategy(),
        ttl in ttl_strategy(),
    ) {
        runtime().block_on(async {
            let service = Arc::new(MockSecretsService::new());
            let secret = LeasedSecret::new(
                HashMap::from([
                    (username_key.clone(), username.clone()),
                    (password_key.clone(), password.clone()),
                ]),
                lease_id.clone(),
                ttl,
                true,
            );
            service.set_secret(&path, secret).await;
            let broker = broker_with(&service);

            let descriptor = broker
                .intercept(descriptor_for(&path, &username_key, &password_key))
                .await
                .unwrap();

            prop_assert_eq!(descriptor.username(), Some(username.as_str()));
            prop_assert_eq!(
                descriptor.password().map(ExposeSecret::expose_secret),
                Some(password.as_str())
            );
            prop_assert_eq!(broker.registry().pending_len().await, 1);
            prop_assert!(service.revoked().await.is_empty());
            Ok(())
        })?;
    }

    /// For any secret missing the username key, intercept fails, the
    /// registry ends empty, and the fetched lease is revoked exactly
    /// once.
    #[test]
    fn prop_missing_key_revokes_exactly_once(
        path in secret_path_strategy(),
        (username_key, password_key) in key_pair_strategy(),
        password in secret_value_strategy(),
        lease_id in lease_id_strategy(),
        ttl in ttl_strategy(),
    ) {
        runtime().block_on(async {
            let service = Arc::new(MockSecretsService::new());
            let secret = LeasedSecret::new(
                HashMap::from([(password_key.clone(), password)]),
                lease_id.clone(),
                ttl,
                true,
            );
            service.set_secret(&path, secret).await;
            let broker = broker_with(&service);

            let err = broker
                .intercept(descriptor_for(&path, &username_key, &password_key))
                .await
                .unwrap_err();

            prop_assert!(
                matches!(
                    err,
                    BrokerError::MissingSecretKey { ref key, .. } if *key == username_key
                ),
                "expected MissingSecretKey for username key"
            );
            prop_assert_eq!(broker.registry().pending_len().await, 0);
            prop_assert_eq!(service.revoke_count(&lease_id).await, 1);
            Ok(())
        })?;
    }

    /// Whichever path a lease takes through the state machine, and
    /// however many stray close notifications follow, revoke happens
    /// exactly once.
    #[test]
    fn prop_lifecycle_revokes_exactly_once(
        lease_id in lease_id_strategy(),
        ttl in ttl_strategy(),
        succeeds in any::<bool>(),
        extra_closes in 1usize..4,
    ) {
        runtime().block_on(async {
            let service = Arc::new(MockSecretsService::new());
            let secret = LeasedSecret::new(
                HashMap::from([
                    ("user".to_string(), "alice".to_string()),
                    ("pass".to_string(), "s3cr3t".to_string()),
                ]),
                lease_id.clone(),
                ttl,
                true,
            );
            service.set_secret("secret/data/db", secret).await;
            let broker = broker_with(&service);

            let descriptor = broker
                .intercept(descriptor_for("secret/data/db", "user", "pass"))
                .await
                .unwrap();
            let attempt = descriptor.attempt();

            let connection = ConnectionId::new();
            if succeeds {
                broker.connected(attempt, connection).await.unwrap();
                broker.connection_closed(connection).await;
            } else {
                broker.connection_failed(attempt).await;
            }

            for _ in 0..extra_closes {
                broker.connection_closed(connection).await;
            }

            prop_assert_eq!(service.revoke_count(&lease_id).await, 1);
            prop_assert_eq!(broker.registry().pending_len().await, 0);
            prop_assert_eq!(broker.registry().active_len().await, 0);
            Ok(())
        })?;
    }

    /// Secret values never leak through `Debug`, on the secret bundle
    /// or on an injected descriptor.
    #[test]
    fn prop_secret_values_redacted_in_debug(
        (username_key, password_key) in key_pair_strategy(),
        username in username_strategy(),
        password in secret_value_strategy(),
        lease_id in lease_id_strategy(),
        ttl in ttl_strategy(),
    ) {
        let secret = LeasedSecret::new(
            HashMap::from([
                (username_key.clone(), username.clone()),
                (password_key.clone(), password.clone()),
            ]),
            lease_id.clone(),
            ttl,
            true,
        );

        let debug = format!("{secret:?}");
        prop_assert!(!debug.contains(&password), "secret value leaked in Debug");
        prop_assert!(debug.contains(&lease_id), "lease id is not a secret");

        runtime().block_on(async {
            let service = Arc::new(MockSecretsService::new());
            service.set_secret("secret/data/db", secret).await;
            let broker = broker_with(&service);

            let descriptor = broker
                .intercept(descriptor_for("secret/data/db", &username_key, &password_key))
                .await
                .unwrap();

            let debug = format!("{descriptor:?}");
            prop_assert!(!debug.contains(&password), "password leaked in descriptor Debug");
            Ok(())
        })?;
    }
}
