// ── Core error types ──
//
// Errors surfaced by petal-core. Consumers never see raw reqwest or JSON
// failures; the `From<petal_api::Error>` impl keeps the four request
// kinds apart (transport, HTTP status, application, parse) because the
// batch and fallback layers branch on them.

use std::time::Duration;

use petal_api::TransportKind;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach backend: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Backend did not respond in time: {reason}")]
    Timeout { reason: String },

    #[error("Request cancelled")]
    Cancelled,

    /// Nothing was sent: this request failed too often recently.
    #[error("Backend unavailable for {key}, retry in {}s", .retry_in.as_secs())]
    CircuitOpen { key: String, retry_in: Duration },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code.
        status: Option<u16>,
    },

    #[error("Request rejected by backend: {message}")]
    Rejected { message: String },

    #[error("Invalid response from backend: {message}")]
    InvalidResponse { message: String },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    #[error("No data source can serve {query}")]
    Unsupported { query: String },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Transport-level failure (network, timeout, cancellation).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::Timeout { .. }
                | Self::Cancelled
                | Self::CircuitOpen { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
            || matches!(self, Self::Api { status: Some(404), .. })
    }

    /// Turn a backend 404 into [`CoreError::NotFound`] for `entity`.
    pub(crate) fn or_not_found(self, entity: &'static str, identifier: impl ToString) -> Self {
        match self {
            Self::Api {
                status: Some(404), ..
            } => Self::NotFound {
                entity,
                identifier: identifier.to_string(),
            },
            other => other,
        }
    }
}

// ── Conversion from petal-api errors ─────────────────────────────────

impl From<petal_api::Error> for CoreError {
    fn from(err: petal_api::Error) -> Self {
        match err {
            petal_api::Error::Transport { kind, message } => match kind {
                TransportKind::Network => CoreError::ConnectionFailed { reason: message },
                TransportKind::Timeout => CoreError::Timeout { reason: message },
                TransportKind::Aborted => CoreError::Cancelled,
            },
            petal_api::Error::HttpStatus { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            petal_api::Error::Application { message } => CoreError::Rejected { message },
            petal_api::Error::Parse { message, .. } | petal_api::Error::UnexpectedShape(message) => {
                CoreError::InvalidResponse { message }
            }
            petal_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            petal_api::Error::ClientBuild(message) => CoreError::Config { message },
            petal_api::Error::CircuitOpen { key, retry_in } => {
                CoreError::CircuitOpen { key, retry_in }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_kinds_stay_distinct() {
        let timeout: CoreError = petal_api::Error::Transport {
            kind: TransportKind::Timeout,
            message: "slow".into(),
        }
        .into();
        assert!(matches!(timeout, CoreError::Timeout { .. }));
        assert!(timeout.is_transport());

        let status: CoreError = petal_api::Error::HttpStatus {
            status: 404,
            message: "gone".into(),
        }
        .into();
        assert!(status.is_not_found());
        assert!(!status.is_transport());

        let rejected: CoreError = petal_api::Error::Application {
            message: "locked".into(),
        }
        .into();
        assert!(matches!(rejected, CoreError::Rejected { .. }));

        let parse: CoreError = petal_api::Error::Parse {
            message: "eof".into(),
            body: String::new(),
        }
        .into();
        assert!(matches!(parse, CoreError::InvalidResponse { .. }));

        let open: CoreError = petal_api::Error::CircuitOpen {
            key: "GET /api/v2/orders".into(),
            retry_in: Duration::from_secs(42),
        }
        .into();
        assert!(open.is_transport());
        assert_eq!(
            open.to_string(),
            "Backend unavailable for GET /api/v2/orders, retry in 42s"
        );
    }
}
