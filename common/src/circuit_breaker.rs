//! Circuit breaker for calls to external services.
//!
//! Consecutive failures open the circuit and reject requests outright;
//! after a cool-down the breaker admits a limited number of probe
//! requests and closes again once enough of them succeed.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests are allowed
    Closed,
    /// Failure threshold exceeded, requests are rejected
    Open,
    /// Cool-down elapsed, limited probe requests are allowed
    HalfOpen,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Consecutive successes in half-open state to close the circuit
    pub success_threshold: u32,
    /// Cool-down before an open circuit admits probe requests
    pub timeout: Duration,
    /// Maximum requests admitted while half-open
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout: Duration::from_secs(30),
            half_open_max_requests: 3,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new config with custom failure threshold.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Create a new config with custom success threshold.
    #[must_use]
    pub const fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Create a new config with custom cool-down timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failures: u32,
    successes: u32,
    half_open_requests: u32,
    last_failure: Option<Instant>,
}

impl Inner {
    const fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            successes: 0,
            half_open_requests: 0,
            last_failure: None,
        }
    }
}

/// Circuit breaker protecting an external service.
///
/// All counters and the state live behind one mutex so transitions are
/// atomic; callers only ever observe a consistent state.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Create a circuit breaker with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }

    /// Check if a request is allowed.
    ///
    /// Returns `true` if the request should proceed, `false` if it should
    /// be rejected.
    pub async fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled_down = inner
                    .last_failure
                    .is_some_and(|last| last.elapsed() >= self.config.timeout);
                if cooled_down {
                    inner.state = CircuitState::HalfOpen;
                    inner.half_open_requests = 1;
                    inner.successes = 0;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_requests < self.config.half_open_max_requests {
                    inner.half_open_requests += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful request.
    ///
    /// In half-open state, consecutive successes close the circuit.
    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::HalfOpen => {
                inner.successes += 1;
                if inner.successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failures = 0;
                    inner.successes = 0;
                }
            }
            CircuitState::Closed => {
                inner.failures = 0;
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed request.
    ///
    /// Consecutive failures open the circuit; a failed half-open probe
    /// reopens it immediately.
    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.failures += 1;
        inner.last_failure = Some(Instant::now());

        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => {
                if inner.failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.successes = 0;
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Get the current circuit state.
    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    /// Get the current consecutive-failure count.
    pub async fn failure_count(&self) -> u32 {
        self.inner.lock().await.failures
    }

    /// Reset the circuit breaker to closed state.
    pub async fn reset(&self) {
        *self.inner.lock().await = Inner::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_state_closed() {
        let cb = CircuitBreaker::with_defaults();
        assert_eq!(cb.state().await, CircuitState::Closed);
        assert!(cb.allow_request().await);
    }

    #[tokio::test]
    async fn test_opens_after_threshold_failures() {
        let config = CircuitBreakerConfig::default().with_failure_threshold(3);
        let cb = CircuitBreaker::new(config);

        for _ in 0..3 {
            cb.record_failure().await;
        }

        assert_eq!(cb.state().await, CircuitState::Open);
        assert!(!cb.allow_request().await);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let config = CircuitBreakerConfig::default().with_failure_threshold(3);
        let cb = CircuitBreaker::new(config);

        cb.record_failure().await;
        cb.record_failure().await;
        cb.record_success().await;

        assert_eq!(cb.failure_count().await, 0);
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_after_cooldown() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            timeout: Duration::from_millis(1),
            half_open_max_requests: 3,
        };
        let cb = CircuitBreaker::new(config);

        cb.record_failure().await;
        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(cb.allow_request().await);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn test_half_open_limits_probe_requests() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 5,
            timeout: Duration::from_millis(1),
            half_open_max_requests: 2,
        };
        let cb = CircuitBreaker::new(config);

        cb.record_failure().await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(cb.allow_request().await);
        assert!(cb.allow_request().await);
        assert!(!cb.allow_request().await);
    }

    #[tokio::test]
    async fn test_closes_after_successful_probes() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 2,
            timeout: Duration::from_millis(1),
            half_open_max_requests: 5,
        };
        let cb = CircuitBreaker::new(config);

        cb.record_failure().await;
        cb.record_failure().await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        cb.allow_request().await;

        cb.record_success().await;
        cb.record_success().await;

        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_reset() {
        let cb = CircuitBreaker::with_defaults();

        cb.record_failure().await;
        cb.record_failure().await;

        cb.reset().await;

        assert_eq!(cb.state().await, CircuitState::Closed);
        assert_eq!(cb.failure_count().await, 0);
    }
}
