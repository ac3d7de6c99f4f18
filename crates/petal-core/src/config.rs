// ── Runtime backend configuration ──
//
// Describes *which* backend to talk to and how hard to try. Carries the
// access token and tuning knobs but never touches disk: petal-config (or
// a test) builds a `BackendConfig` and hands it to `Backoffice`.

use std::path::PathBuf;
use std::time::Duration;

use petal_api::{CircuitBreaker, RetryPolicy, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Default tenant id sent with product queries.
pub const DEFAULT_CITY_ID: &str = "2";

/// Connection and resilience settings for one backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend root (e.g. `https://shop.example.com`).
    pub base_url: Url,
    /// Static token appended to every request as `access_token`.
    pub access_token: Option<SecretString>,
    /// Tenant id for product queries.
    pub city_id: String,
    pub shop_id: Option<u64>,
    /// Extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Retries for GET requests.
    pub read_retries: u32,
    /// First backoff delay.
    pub retry_base_delay: Duration,
    /// TTL for cached per-customer orders.
    pub cache_ttl: Duration,
    /// Items fetched concurrently per batch chunk.
    pub batch_size: usize,
    /// Deadline for a single batch item.
    pub item_timeout: Duration,
    /// Orders requested per customer on the legacy path.
    pub orders_per_customer: u32,
    /// Consecutive failures that open a request's circuit. 0 disables it.
    pub breaker_threshold: u32,
    /// How long an open circuit short-circuits calls.
    pub breaker_open_for: Duration,
}

impl BackendConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            access_token: None,
            city_id: DEFAULT_CITY_ID.into(),
            shop_id: None,
            ca_cert: None,
            timeout: Duration::from_secs(20),
            read_retries: 2,
            retry_base_delay: Duration::from_millis(300),
            cache_ttl: Duration::from_secs(60),
            batch_size: 5,
            item_timeout: Duration::from_secs(10),
            orders_per_customer: 50,
            breaker_threshold: 5,
            breaker_open_for: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Reject settings that would make the layer unusable.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.batch_size == 0 {
            return Err(CoreError::Config {
                message: "batch_size must be at least 1".into(),
            });
        }
        if self.timeout.is_zero() || self.item_timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeouts must be non-zero".into(),
            });
        }
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                message: format!("unsupported URL scheme: {}", self.base_url.scheme()),
            });
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: self.timeout,
            read_retries: self.read_retries,
            base_delay: self.retry_base_delay,
            ..RetryPolicy::default()
        }
    }

    pub fn circuit_breaker(&self) -> CircuitBreaker {
        CircuitBreaker::new(self.breaker_threshold, self.breaker_open_for)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self
                .ca_cert
                .clone()
                .map_or(TlsMode::System, TlsMode::CustomCa),
            ..TransportConfig::default()
        }
    }
}
