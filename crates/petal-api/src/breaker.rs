// Per-request circuit breaker.
//
//   closed ──failure × threshold──▶ open ──open_for elapsed──▶ closed
//     ▲                                                          │
//     └──────────────────────success─────────────────────────────┘
//
// Keyed by method + path + query (without the access token), so one
// failing customer's `orders.php` does not block the others. Only
// failures that say "the backend is unhealthy" count: transport errors,
// 5xx and unparsable bodies. A caller abort counts as nothing.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::envelope::{FailureKind, ResponseEnvelope};
use crate::error::{Error, TransportKind};

/// Consecutive failures that open a circuit. Default: 5.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
/// How long an open circuit rejects calls. Default: 60s.
pub const DEFAULT_OPEN_FOR: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct Circuit {
    failures: u32,
    open_until: Option<Instant>,
}

/// Failure counter per request key. A threshold of zero disables it.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    open_for: Duration,
    circuits: DashMap<String, Circuit>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD, DEFAULT_OPEN_FOR)
    }
}

impl CircuitBreaker {
    pub fn new(threshold: u32, open_for: Duration) -> Self {
        Self {
            threshold,
            open_for,
            circuits: DashMap::new(),
        }
    }

    /// A breaker that never opens.
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold > 0
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn open_for(&self) -> Duration {
        self.open_for
    }

    /// `Err(remaining)` while the circuit for `key` is open. An expired
    /// circuit is reset here, failure count included.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        if !self.is_enabled() {
            return Ok(());
        }
        let now = Instant::now();
        let open_until = self.circuits.get(key).and_then(|c| c.open_until);
        match open_until {
            Some(until) if now <= until => Err(until - now),
            Some(_) => {
                debug!(key, "circuit closed after cool-down");
                self.circuits.remove(key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn is_open(&self, key: &str) -> bool {
        self.check(key).is_err()
    }

    pub fn record_success(&self, key: &str) {
        self.circuits.remove(key);
    }

    /// Count one failure; returns `true` when this failure opened the circuit.
    pub fn record_failure(&self, key: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let mut circuit = self.circuits.entry(key.to_owned()).or_default();
        circuit.failures = circuit.failures.saturating_add(1);
        if circuit.failures >= self.threshold && circuit.open_until.is_none() {
            circuit.open_until = Some(Instant::now() + self.open_for);
            warn!(
                key,
                failures = circuit.failures,
                open_for_s = self.open_for.as_secs(),
                "circuit opened"
            );
            return true;
        }
        false
    }

    /// Feed a terminal call outcome into the counter for `key`.
    pub fn observe(&self, key: &str, outcome: &Result<ResponseEnvelope, Error>) {
        match outcome {
            Err(Error::Transport {
                kind: TransportKind::Aborted,
                ..
            }) => {}
            Err(Error::Transport { .. })
            | Ok(ResponseEnvelope::Failure {
                kind: FailureKind::HttpStatus(500..=599) | FailureKind::Parse { .. },
                ..
            }) => {
                self.record_failure(key);
            }
            Err(_) => {}
            Ok(_) => self.record_success(key),
        }
    }
}
