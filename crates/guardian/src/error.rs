//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use guardian_config::ConfigError;
use guardian_core::CoreError;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Router Guardian at {url}")]
    #[diagnostic(
        code(guardian::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             Set the address with --server or: guardian config set server.url <url>"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(guardian::timeout),
        help("Increase the timeout with --timeout or check the service's responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────
    #[error("device '{identifier}' not found")]
    #[diagnostic(
        code(guardian::not_found),
        help("Run: guardian devices list to see known devices")
    )]
    NotFound { identifier: String },

    #[error("Another block/unblock request is still in flight")]
    #[diagnostic(
        code(guardian::conflict),
        help("Wait for the previous request to finish and try again.")
    )]
    MutationInFlight,

    // ── API ──────────────────────────────────────────────────────────
    #[error("Service error: {message}")]
    #[diagnostic(code(guardian::api_error))]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(guardian::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Unknown config key '{key}'")]
    #[diagnostic(code(guardian::config), help("Settable keys: {available}"))]
    UnknownKey { key: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(guardian::config),
        help("Inspect the file with: guardian config show")
    )]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(guardian::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Api {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::MutationInFlight => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::UnknownKey { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Disconnected => Self::ConnectionFailed {
                url: "(disconnected)".into(),
                reason: "connection was closed".into(),
            },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::DeviceNotFound { identifier } => Self::NotFound { identifier },
            CoreError::InvalidDuration { input } => Self::Validation {
                field: "duration".into(),
                reason: format!(
                    "'{input}' is not a positive number followed by 'h' or 'm' (e.g. 1h, 30m)"
                ),
            },
            CoreError::MutationInFlight => Self::MutationInFlight,
            CoreError::Api { message, status } => Self::Api { message, status },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownKey { key } => Self::UnknownKey {
                key,
                available: guardian_config::SETTABLE_KEYS.join(", "),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(
            CliError::from(CoreError::MutationInFlight).exit_code(),
            exit_code::CONFLICT
        );
        assert_eq!(
            CliError::from(CoreError::Timeout { timeout_secs: 5 }).exit_code(),
            exit_code::TIMEOUT
        );
        assert_eq!(
            CliError::from(CoreError::InvalidDuration { input: "2d".into() }).exit_code(),
            exit_code::USAGE
        );
        assert_eq!(
            CliError::from(CoreError::Api {
                message: "HTTP 404".into(),
                status: Some(404),
            })
            .exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(CoreError::Api {
                message: "HTTP 500".into(),
                status: Some(500),
            })
            .exit_code(),
            exit_code::GENERAL
        );
    }

    #[test]
    fn unknown_key_lists_settable_keys() {
        let err = CliError::from(ConfigError::UnknownKey { key: "nope".into() });
        let CliError::UnknownKey { available, .. } = &err else {
            panic!("expected UnknownKey, got {err:?}");
        };
        assert!(available.contains("dashboard.page_size"));
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
