//! CLI error types with miette diagnostics.
//!
//! Maps `wpe_api::Error` and `ConfigError` variants into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use wpe_config::ConfigError;

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
    #[error("Could not reach the WP Engine API")]
    #[diagnostic(
        code(wpe::connection_failed),
        help(
            "Check your network connection and the API URL.\n\
             Run with -vv to see the request URLs."
        )
    )]
    ConnectionFailed {
        #[source]
        source: wpe_api::Error,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(wpe::timeout),
        help("Increase timeout with --timeout or retry later.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wpe::auth_failed),
        help(
            "Verify your API user id and password.\n\
             Credentials are generated at https://my.wpengine.com/api_access\n\
             Run: wpe config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(wpe::no_credentials),
        help(
            "Configure credentials with: wpe config init\n\
             Or set WPENGINE_USER_ID and WPENGINE_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(wpe::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from the API: {message}")]
    #[diagnostic(
        code(wpe::decode),
        help("The API returned a body that is not the expected JSON shape.")
    )]
    Decode { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wpe::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wpe::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wpe config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(wpe::config))]
    Config { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(wpe::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ApiError { status: 404, .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── wpe_api::Error → CliError mapping ────────────────────────────────

impl From<wpe_api::Error> for CliError {
    fn from(err: wpe_api::Error) -> Self {
        match err {
            wpe_api::Error::Transport(_) => CliError::ConnectionFailed { source: err },
            wpe_api::Error::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            wpe_api::Error::Authentication { message } => CliError::AuthFailed { message },
            wpe_api::Error::Api { status, message } => CliError::ApiError { status, message },
            wpe_api::Error::Decode { message, .. } => CliError::Decode { message },
            wpe_api::Error::Config { message } => CliError::Config { message },
            wpe_api::Error::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Client(e) => CliError::from(e),
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
