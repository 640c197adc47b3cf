use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Credentials for the WP Engine API (an API user id + password pair).
///
/// Generated at: <https://my.wpengine.com/api_access>. Immutable once
/// built; the password never appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Build a credential pair, rejecting empty halves.
    ///
    /// An empty user or password would otherwise produce a malformed
    /// `Basic` token that the API rejects with an opaque 401.
    pub fn new(username: impl Into<String>, password: SecretString) -> Result<Self, Error> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(Error::config("API user id is empty"));
        }
        if password.expose_secret().is_empty() {
            return Err(Error::config("API password is empty"));
        }
        Ok(Self { username, password })
    }

    /// The API user id.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Basic base64(user:pass)`, the full `Authorization` header value.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password.expose_secret());
        format!("Basic {}", STANDARD.encode(raw))
    }

    /// The header value with the sensitive flag set so it is redacted
    /// from reqwest's debug output.
    pub(crate) fn header_value(&self) -> Result<HeaderValue, Error> {
        let mut value = HeaderValue::from_str(&self.basic_auth_header())
            .map_err(|e| Error::config(format!("invalid Authorization header value: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}
