use std::time::Duration;

use reqwest::Method;
use thiserror::Error;

/// What went wrong below the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connection refused, DNS failure, reset mid-body, etc.
    Network,
    /// The per-attempt timeout fired before a full response arrived.
    Timeout,
    /// The caller's cancellation token fired.
    Aborted,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Network => "network error",
            Self::Timeout => "timed out",
            Self::Aborted => "aborted",
        })
    }
}

/// Top-level error type for the `petal-api` crate.
///
/// The four request-level kinds (transport, HTTP status, application,
/// parse) are kept apart because retry, batching, and fallback logic
/// upstream branch on them. `petal-core` maps these into domain errors.
///
/// `Clone` so one in-flight result can be handed to every deduplicated
/// caller.
#[derive(Debug, Clone, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Network failure, timeout, or abort. Retryable for GET only.
    #[error("Transport error ({kind}): {message}")]
    Transport { kind: TransportKind, message: String },

    /// URL construction failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Too many recent failures for this request; nothing was sent.
    #[error("Circuit open for {key}, retrying in {retry_in:?}")]
    CircuitOpen { key: String, retry_in: Duration },

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response. Retryable only for GET + 5xx.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// 2xx response whose body declared `success: false` or `status: false`.
    #[error("Backend rejected request: {message}")]
    Application { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Body was not valid JSON, with the raw body for debugging.
    #[error("Malformed JSON response: {message}")]
    Parse { message: String, body: String },

    /// JSON was valid but did not match the endpoint's wire model.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl Error {
    /// Returns `true` for transport-level failures (network, timeout, abort).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when the circuit breaker short-circuited the call.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    /// Returns `true` if this is a 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether another attempt may fix this failure for the given method.
    ///
    /// Only idempotent reads are retried: network errors, timeouts,
    /// and 5xx responses. Application and parse errors are terminal.
    pub fn is_retryable(&self, method: &Method) -> bool {
        if *method != Method::GET {
            return false;
        }
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }

    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else {
            TransportKind::Network
        };
        Self::Transport {
            kind,
            message: err.to_string(),
        }
    }
}
