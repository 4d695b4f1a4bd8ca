//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use huebeat_config::ConfigError;
use huebeat_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach bridge at {host}: {reason}")]
    #[diagnostic(
        code(huebeat::connection_failed),
        help(
            "Check that the bridge is powered and on the same network.\n\
             Host: {host}"
        )
    )]
    ConnectionFailed { host: String, reason: String },

    #[error("Bridge request timed out after {seconds}s")]
    #[diagnostic(
        code(huebeat::timeout),
        help("Increase the timeout with --timeout or [bridge] timeout in the config file.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Bridge at {host} rejected the username")]
    #[diagnostic(
        code(huebeat::not_authenticated),
        help(
            "The username is not whitelisted on this bridge.\n\
             Pass a valid one with --username or HUEBEAT_USERNAME."
        )
    )]
    NotAuthenticated { host: String },

    #[error("No bridge username configured")]
    #[diagnostic(
        code(huebeat::no_credentials),
        help(
            "Set HUEBEAT_USERNAME, pass --username, or add `username` /\n\
             `username_env` to the [bridge] section of {path}"
        )
    )]
    NoCredentials { path: String },

    // ── Bridge responses ─────────────────────────────────────────────

    #[error("Bridge returned {count} error(s) for {resource}: {summary}")]
    #[diagnostic(code(huebeat::bridge_error))]
    BridgeError {
        resource: String,
        count: usize,
        summary: String,
    },

    #[error("Bridge sent an unreadable response for {resource}")]
    #[diagnostic(
        code(huebeat::malformed_response),
        help("The host may not be a lighting bridge. Re-run with -vv to see the request.")
    )]
    MalformedResponse { resource: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No bridge host configured")]
    #[diagnostic(
        code(huebeat::no_host),
        help(
            "Set HUEBEAT_HOST, pass --host, or add `host` to the [bridge]\n\
             section of {path}"
        )
    )]
    NoHost { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(huebeat::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(huebeat::config))]
    Config(Box<figment::Error>),

    #[error("Failed to render config: {0}")]
    #[diagnostic(code(huebeat::config_render))]
    ConfigRender(#[from] toml::ser::Error),

    // ── Internal / IO ────────────────────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(huebeat::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotAuthenticated { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NoHost { .. } | Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            Self::BridgeError { .. }
            | Self::MalformedResponse { .. }
            | Self::ConfigRender(_)
            | Self::Internal(_)
            | Self::Io(_)
            | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { host, reason } => {
                CliError::ConnectionFailed { host, reason }
            }
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "bridge".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = huebeat_config::config_path().display().to_string();
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoHost => CliError::NoHost { path },
            ConfigError::NoCredentials => CliError::NoCredentials { path },
            ConfigError::Serialization(e) => CliError::ConfigRender(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
