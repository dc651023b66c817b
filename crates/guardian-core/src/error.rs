// ── Core error types ──
//
// User-facing errors from guardian-core. Consumers never see raw reqwest
// errors; the `From<guardian_api::Error>` impl maps transport failures
// into the variants below.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Router Guardian at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Not connected")]
    Disconnected,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Invalid block duration {input:?}: expected a positive number followed by 'h' or 'm' (e.g. 1h, 30m)")]
    InvalidDuration { input: String },

    #[error("Another block/unblock request is still in flight")]
    MutationInFlight,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<guardian_api::Error> for CoreError {
    fn from(err: guardian_api::Error) -> Self {
        match err {
            guardian_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            guardian_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            guardian_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            guardian_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            guardian_api::Error::Http { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {body}")
                },
                status: Some(status),
            },
            guardian_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl CoreError {
    /// Returns `true` when the service could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_keep_status() {
        let err = CoreError::from(guardian_api::Error::Http {
            status: 502,
            body: "bad gateway".into(),
        });
        assert!(matches!(
            err,
            CoreError::Api {
                status: Some(502),
                ..
            }
        ));
        assert!(!err.is_unreachable());
    }

    #[test]
    fn api_timeouts_map_to_timeout() {
        let err = CoreError::from(guardian_api::Error::Timeout { timeout_secs: 10 });
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 10 }));
        assert!(err.is_unreachable());
    }
}
