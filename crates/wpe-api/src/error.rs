use serde::Serialize;
use thiserror::Error;

/// Top-level error type for the `wpe-api` crate.
///
/// Every client operation returns `Result<T, Error>`; nothing is signalled
/// through the shape of a successful value. The CLI maps these into
/// user-facing diagnostics, and [`ErrorBody`] renders them as the
/// `{"error": "..."}` object expected by JSON consumers.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Client could not be constructed (missing credentials, bad base URL,
    /// unreadable CA certificate, ...).
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// HTTP 401 from the API.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Any other non-success status.
    #[error("WP Engine API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body was not the JSON shape we expected.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the API rejected our credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
                body: String::new(),
            }
        } else {
            Self::Transport(err)
        }
    }
}

/// JSON rendering of a failed operation: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        // Walk the source chain so transport failures carry the root cause
        // ("connection refused") rather than reqwest's generic wrapper text.
        // `Transport` already prints the reqwest error, so start below it.
        let mut message = err.to_string();
        let mut source = match err {
            Error::Transport(inner) => std::error::Error::source(inner),
            other => std::error::Error::source(other),
        };
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { error: message }
    }
}
