//! Shared proptest generators for broker domain types.

use proptest::prelude::*;
use std::time::Duration;

/// Generate Vault-shaped lease identifiers.
pub fn lease_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{8}/[a-z0-9]{8}/[a-z0-9]{8}"
}

/// Generate valid secret paths.
pub fn secret_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("secret/data/db".to_string()),
        Just("database/creds/readonly".to_string()),
        prop::collection::vec("[a-z][a-z0-9]{2,10}", 1..4)
            .prop_map(|segments| format!("database/creds/{}", segments.join("/"))),
    ]
}

/// Generate secret field names (username/password keys).
pub fn key_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{2,12}"
}

/// Generate secret values.
pub fn secret_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!@#$%^&*]{8,64}"
}

/// Generate usernames.
pub fn username_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{3,15}"
}

/// Generate Vault service tokens.
pub fn token_strategy() -> impl Strategy<Value = String> {
    "hvs\\.[A-Za-z0-9]{24}"
}

/// Generate TTL values (1 minute to 24 hours).
pub fn ttl_strategy() -> impl Strategy<Value = Duration> {
    (60u64..86400).prop_map(Duration::from_secs)
}
