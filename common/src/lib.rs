//! Shared library for cross-cutting concerns in connbroker crates.
//!
//! This crate provides centralized implementations for:
//! - Error types with retryability classification
//! - HTTP client configuration and building
//! - Retry policies with exponential backoff
//! - Circuit breaker pattern for resilience

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod circuit_breaker;
pub mod error;
pub mod http;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use error::{CommonError, Retryable};
pub use http::{HttpConfig, build_http_client};
pub use retry::{RetryConfig, RetryPolicy};
