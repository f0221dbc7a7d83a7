//! Centralized HTTP client configuration and building.
//!
//! All outbound HTTP in the workspace goes through a client built here,
//! so timeouts, pooling, and TLS behavior stay consistent.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout (default: 30s)
    pub timeout: Duration,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Accept self-signed server certificates.
    ///
    /// Only intended for development Vault instances; leave disabled in
    /// production.
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: "connbroker/0.1".to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl HttpConfig {
    /// Create a new HTTP config with custom timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a new HTTP config with custom connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Create a new HTTP config with custom user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Accept self-signed server certificates.
    #[must_use]
    pub const fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

/// Build a configured HTTP client.
///
/// Creates a reqwest client with rustls TLS and the specified
/// configuration.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS
/// initialization fails).
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .use_rustls_tls()
        .build()
}
