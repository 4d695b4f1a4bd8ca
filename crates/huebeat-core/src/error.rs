// ── Core error types ──
//
// User-facing errors from huebeat-core. The `From<huebeat_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.
// None of these ever stop a running poller: tick failures are reported as
// connectivity events, not errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot reach bridge at {host}: {reason}")]
    ConnectionFailed { host: String, reason: String },

    #[error("Bridge request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<huebeat_api::Error> for CoreError {
    fn from(err: huebeat_api::Error) -> Self {
        match err {
            huebeat_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            huebeat_api::Error::Transport(ref e) if e.is_timeout() => {
                CoreError::Timeout { timeout_secs: 0 }
            }
            huebeat_api::Error::Transport(e) => CoreError::ConnectionFailed {
                host: e
                    .url()
                    .and_then(|u| u.host_str().map(String::from))
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            huebeat_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid bridge host: {e}"),
            },
            huebeat_api::Error::ClientBuild(msg) => {
                CoreError::Internal(format!("HTTP client: {msg}"))
            }
        }
    }
}
