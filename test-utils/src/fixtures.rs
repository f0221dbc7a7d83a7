//! Test fixtures with sample descriptors and secrets.

use connbroker::{ConnectionDescriptor, LeasedSecret};
use std::collections::HashMap;
use std::time::Duration;

/// Descriptor configured for the standard database secret profile.
#[must_use]
pub fn database_descriptor() -> ConnectionDescriptor {
    ConnectionDescriptor::new()
        .with_property("secret.path", "secret/data/db")
        .with_property("secret.usernameKey", "user")
        .with_property("secret.passwordKey", "pass")
}

/// Dynamic database secret matching [`database_descriptor`].
#[must_use]
pub fn database_secret() -> LeasedSecret {
    LeasedSecret::new(
        HashMap::from([
            ("user".to_string(), "alice".to_string()),
            ("pass".to_string(), "s3cr3t".to_string()),
            ("ttl".to_string(), "3600".to_string()),
        ]),
        "lease-1",
        Duration::from_secs(3600),
        true,
    )
}

/// Same as [`database_secret`] but with the username field missing.
#[must_use]
pub fn password_only_secret() -> LeasedSecret {
    LeasedSecret::new(
        HashMap::from([("pass".to_string(), "s3cr3t".to_string())]),
        "lease-1",
        Duration::from_secs(3600),
        true,
    )
}

/// Vault-shaped PostgreSQL credentials with a non-renewable lease.
#[must_use]
pub fn postgres_secret() -> LeasedSecret {
    LeasedSecret::new(
        HashMap::from([
            (
                "user".to_string(),
                "v-token-postgres-readonly-abc123".to_string(),
            ),
            ("pass".to_string(), "A1b2C3d4E5f6G7h8I9j0".to_string()),
        ]),
        "database/creds/readonly/abc123",
        Duration::from_secs(3600),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_descriptor_matches_secret() {
        let descriptor = database_descriptor();
        let secret = database_secret();

        let username_key = descriptor.property("secret.usernameKey").unwrap();
        let password_key = descriptor.property("secret.passwordKey").unwrap();

        assert_eq!(
            secret.value(username_key).map(ExposeSecret::expose_secret),
            Some("alice")
        );
        assert_eq!(
            secret.value(password_key).map(ExposeSecret::expose_secret),
            Some("s3cr3t")
        );
    }

    #[test]
    fn test_password_only_secret_lacks_username() {
        let secret = password_only_secret();
        assert!(!secret.contains_key("user"));
        assert!(secret.contains_key("pass"));
    }

    #[test]
    fn test_postgres_secret_is_not_renewable() {
        assert!(!postgres_secret().renewable);
    }
}
