//! Connection identities and the descriptor exchanged with the host.

use secrecy::SecretString;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Identity of one in-flight connection-establishment attempt.
///
/// Every descriptor carries its own unique attempt id, so the pairing
/// between a pending lease and the attempt that created it is always
/// unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Create a fresh attempt identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of an established connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a fresh connection identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Descriptor for an outgoing connection, as handed over by the host.
///
/// Carries the per-profile configuration properties and the credential
/// slots the interceptor fills in. The password never appears in `Debug`
/// output.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    attempt: AttemptId,
    properties: HashMap<String, String>,
    username: Option<String>,
    password: Option<SecretString>,
}

impl ConnectionDescriptor {
    /// Create a descriptor with a fresh attempt identity and no properties.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attempt: AttemptId::new(),
            properties: HashMap::new(),
            username: None,
            password: None,
        }
    }

    /// Add a configuration property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The attempt identity of this descriptor.
    #[must_use]
    pub const fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Look up a configuration property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// All configuration properties.
    #[must_use]
    pub const fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// Fill the outgoing credential slots.
    pub fn set_credentials(&mut self, username: String, password: SecretString) {
        self.username = Some(username);
        self.password = Some(password);
    }

    /// The injected username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The injected password, if any.
    #[must_use]
    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("attempt", &self.attempt)
            .field("properties", &self.properties)
            .field("username", &self.username)
            .field(
                "password",
                &self.password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
