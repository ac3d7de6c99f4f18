// Retry policy and the attempt state machine.
//
//   Attempt(n) ──ok──────────────────────────────▶ Done(Ok)
//       │      ──retryable, n < max──▶ Wait(n, d) ──sleep(d)──▶ Attempt(n+1)
//       └──────terminal / exhausted──────────────▶ Done(Err | Failure)
//
// Delays go through a `Sleeper` so tests can observe the schedule
// without waiting on wall-clock time.

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::Method;

use crate::envelope::{FailureKind, ResponseEnvelope};
use crate::error::Error;

// ── Sleeper ──────────────────────────────────────────────────────────

/// Cooperative timer used between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

/// Production sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}

// ── RetryPolicy ──────────────────────────────────────────────────────

/// Timeout and retry defaults applied when a `RequestSpec` carries no
/// override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Per-attempt timeout. Default: 20s.
    pub timeout: Duration,
    /// Retries for GET. Default: 2.
    pub read_retries: u32,
    /// Retries for POST/PUT/PATCH/DELETE. Default: 0.
    pub write_retries: u32,
    /// First backoff delay; doubles every attempt. Default: 300ms.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            read_retries: 2,
            write_retries: 0,
            base_delay: Duration::from_millis(300),
        }
    }
}

/// One state of the per-call retry loop.
#[derive(Debug)]
pub enum RetryState {
    /// Issue attempt `n` (zero-based).
    Attempt(u32),
    /// Attempt `completed` failed retryably; sleep `delay` then retry.
    Wait { completed: u32, delay: Duration },
    /// Terminal outcome.
    Done(Result<ResponseEnvelope, Error>),
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`: `base_delay * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Retry budget for `method`, honouring a per-call override.
    pub fn max_retries(&self, method: &Method, mutating: bool, over: Option<u32>) -> u32 {
        over.unwrap_or(if mutating || *method != Method::GET {
            self.write_retries
        } else {
            self.read_retries
        })
    }

    /// Transition out of `Attempt(attempt)` given its raw outcome.
    ///
    /// `outcome` is `Err` only for transport failures; every response
    /// that arrived is an envelope. A caller-cancelled request is never
    /// retried, since the next attempt would abort immediately.
    pub fn after_attempt(
        &self,
        method: &Method,
        attempt: u32,
        max_retries: u32,
        outcome: Result<ResponseEnvelope, Error>,
        caller_cancelled: bool,
    ) -> RetryState {
        let attempts_left = attempt < max_retries;

        let retryable = match &outcome {
            Ok(ResponseEnvelope::Failure {
                kind: FailureKind::HttpStatus(status),
                ..
            }) => *method == Method::GET && (500..600).contains(status),
            Ok(_) => false,
            Err(e) => e.is_retryable(method) && !caller_cancelled,
        };

        if retryable && attempts_left {
            RetryState::Wait {
                completed: attempt,
                delay: self.backoff(attempt),
            }
        } else {
            RetryState::Done(outcome)
        }
    }
}
