// WP Engine API HTTP client
//
// Wraps `reqwest::Client` with base-URL construction, Basic auth, and
// status/body handling. Endpoint groups (sites, installs) are implemented
// as inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.wpengineapi.com/v1/";

/// Error body shape: `{"message": "...", "errors": [{"message": "..."}]}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Everything needed to construct a [`WpEngineClient`].
///
/// Built explicitly by the caller (see `wpe-config`); the client never
/// reads the process environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Credentials,
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Config against the production API with default transport settings.
    pub fn new(credentials: Credentials) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            credentials,
            transport: TransportConfig::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }
}

/// Async client for the WP Engine hosting API.
///
/// One request in flight at a time; the only state is the immutable
/// credential header baked into the underlying `reqwest::Client`.
pub struct WpEngineClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl WpEngineClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client, injecting `Authorization` and `Accept` as default
    /// headers on every request.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, config.credentials.header_value()?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = config.transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(config.base_url)?;

        debug!(user = config.credentials.username(), %base_url, "WP Engine client ready");
        Ok(Self {
            http,
            base_url,
            timeout: config.transport.timeout,
        })
    }

    /// Ensure the base ends with `/` so relative joins append rather than
    /// replace the last path segment.
    fn normalize_base_url(mut url: Url) -> Result<Url, Error> {
        if url.cannot_be_a_base() {
            return Err(Error::config(format!("API base URL {url} cannot be a base")));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// The API root every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve a relative endpoint (e.g. `"sites"`) under the base URL.
    pub(crate) fn url(&self, endpoint: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded, for
    /// paths that embed caller-supplied identifiers.
    pub(crate) fn segments_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config("API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Whether `url` lives under the same origin as the API base.
    pub(crate) fn same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue a request against `endpoint` and return the decoded JSON body.
    ///
    /// For `GET`, `args` become URL-encoded query parameters. For every
    /// other method `args` is sent as a JSON object body (an empty map
    /// still sends `{}`). An empty response body decodes to `null`.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        args: &Map<String, Value>,
    ) -> Result<Value, Error> {
        let url = self.url(endpoint)?;
        let body = if method == Method::GET {
            let query = query_pairs(args);
            self.execute(method, url, &query, None::<&()>).await?
        } else {
            self.execute(method, url, &[], Some(args)).await?
        };
        decode(body)
    }

    /// GET an absolute URL and decode the body as `T`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let body = self.execute(Method::GET, url, &[], None::<&()>).await?;
        decode(body)
    }

    /// POST a JSON body and decode the response as `T`.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let body = self.execute(Method::POST, url, &[], Some(body)).await?;
        decode(body)
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<String, Error> {
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            // `.json()` also sets `Content-Type: application/json`.
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::from(err)
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(%status, bytes = body.len(), "response received");

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body).unwrap_or_else(|| status.to_string());
        if status == reqwest::StatusCode::UNAUTHORIZED {
            Err(Error::Authentication { message })
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Decode a response body; an empty body is JSON `null`.
fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    let text = if body.trim().is_empty() { "null" } else { &body };
    serde_json::from_str(text).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Decode {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    let details: Vec<String> = parsed
        .errors
        .into_iter()
        .filter_map(|d| d.message)
        .collect();
    match (parsed.message, details.is_empty()) {
        (Some(msg), true) => Some(msg),
        (Some(msg), false) => Some(format!("{msg} ({})", details.join("; "))),
        (None, false) => Some(details.join("; ")),
        (None, true) => None,
    }
}

/// Flatten JSON args into query pairs. Strings are used verbatim; other
/// scalars use their JSON text; `null` becomes an empty value.
fn query_pairs(args: &Map<String, Value>) -> Vec<(String, String)> {
    args.iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}
