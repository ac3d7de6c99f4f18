//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use petal_config::ConfigError;
use petal_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend")]
    #[diagnostic(
        code(petal::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Backend did not respond in time")]
    #[diagnostic(
        code(petal::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Access denied by the backend")]
    #[diagnostic(
        code(petal::auth_failed),
        help(
            "Verify the access token.\n\
             Set it with --token or the PETAL_ACCESS_TOKEN environment variable."
        )
    )]
    AuthFailed,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(petal::not_found),
        help("Run: petal {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(petal::api_error))]
    ApiError { code: String, message: String },

    #[error("{message}")]
    #[diagnostic(
        code(petal::unsupported),
        help("No data source could serve this request. Run with -v for details.")
    )]
    Unsupported { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(petal::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No backend configured")]
    #[diagnostic(
        code(petal::no_config),
        help(
            "Create a config with: petal config init --base-url <URL>\n\
             Or pass --base-url / set PETAL_BASE_URL.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(petal::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(petal::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(petal::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn list_command(entity: &str) -> String {
    match entity {
        "inventory item" => "inventory list".into(),
        other => format!("{other}s list"),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::Timeout { .. } => CliError::Timeout,

            CoreError::Cancelled => CliError::ApiError {
                code: "cancelled".into(),
                message: "request cancelled".into(),
            },

            CoreError::Api {
                status: Some(401 | 403),
                ..
            } => CliError::AuthFailed,

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "http".into(), |s| s.to_string()),
                message,
            },

            CoreError::Rejected { message } => CliError::ApiError {
                code: "rejected".into(),
                message,
            },

            CoreError::InvalidResponse { message } => CliError::ApiError {
                code: "invalid_response".into(),
                message,
            },

            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                list_command: list_command(entity),
                resource_type: entity.into(),
                identifier,
            },

            err @ CoreError::Unsupported { .. } => CliError::Unsupported {
                message: err.to_string(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            err @ CoreError::CircuitOpen { .. } => CliError::ConnectionFailed {
                reason: err.to_string(),
            },

            CoreError::InvalidInput { field, reason } => CliError::Validation {
                field: field.into(),
                reason,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingBaseUrl => CliError::NoConfig {
                path: petal_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let not_found: CliError = CoreError::NotFound {
            entity: "customer",
            identifier: "7".into(),
        }
        .into();
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let auth: CliError = CoreError::Api {
            message: "forbidden".into(),
            status: Some(403),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let down: CliError = CoreError::ConnectionFailed {
            reason: "refused".into(),
        }
        .into();
        assert_eq!(down.exit_code(), exit_code::CONNECTION);

        let slow: CliError = CoreError::Timeout {
            reason: "20s".into(),
        }
        .into();
        assert_eq!(slow.exit_code(), exit_code::TIMEOUT);

        let open: CliError = CoreError::CircuitOpen {
            key: "GET /api/v2/orders".into(),
            retry_in: std::time::Duration::from_secs(42),
        }
        .into();
        assert_eq!(open.exit_code(), exit_code::CONNECTION);
        assert!(matches!(&open, CliError::ConnectionFailed { reason } if reason.contains("42s")));

        let bad: CliError = CoreError::InvalidInput {
            field: "price",
            reason: "must not be negative".into(),
        }
        .into();
        assert_eq!(bad.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn not_found_hint_names_the_list_command() {
        let err: CliError = CoreError::NotFound {
            entity: "inventory item",
            identifier: "8".into(),
        }
        .into();
        assert!(matches!(err, CliError::NotFound { ref list_command, .. } if list_command == "inventory list"));
    }

    #[test]
    fn missing_base_url_is_a_usage_error() {
        let err: CliError = ConfigError::MissingBaseUrl.into();
        assert!(matches!(err, CliError::NoConfig { .. }));
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
