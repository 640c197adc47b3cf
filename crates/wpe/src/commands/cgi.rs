//! CGI responder.
//!
//! A POST carrying a form field named `sites` gets the site listing as
//! JSON (or `{"error": "..."}`); every other request gets a static HTML
//! placeholder page. Failures never produce a non-JSON body once the JSON
//! branch is chosen.

use std::convert::Infallible;
use std::io::{self, Read, Write};

use bytes::Bytes;
use futures_util::stream;
use tracing::{debug, warn};
use wpe_api::{ErrorBody, WpEngineClient};

use crate::error::CliError;
use crate::output;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Upper bound on the form body we are willing to read.
const MAX_BODY: u64 = 64 * 1024;

/// The parts of a CGI request this responder looks at.
#[derive(Debug, Default)]
pub struct CgiRequest {
    pub method: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// `CONTENT_LENGTH` exceeded [`MAX_BODY`]; `body` holds only a prefix.
    pub truncated: bool,
}

impl CgiRequest {
    /// Read the request from the CGI environment and stdin.
    pub fn from_env(stdin: impl Read) -> io::Result<Self> {
        Self::from_parts(
            std::env::var("REQUEST_METHOD").ok(),
            std::env::var("CONTENT_TYPE").ok(),
            std::env::var("CONTENT_LENGTH").ok().as_deref(),
            stdin,
        )
    }

    fn from_parts(
        method: Option<String>,
        content_type: Option<String>,
        content_length: Option<&str>,
        stdin: impl Read,
    ) -> io::Result<Self> {
        let declared = content_length
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let truncated = declared > MAX_BODY;
        if truncated {
            warn!(declared, limit = MAX_BODY, "request body exceeds limit");
        }

        let mut body = Vec::new();
        let length = declared.min(MAX_BODY);
        if length > 0 {
            stdin.take(length).read_to_end(&mut body)?;
        }
        Ok(Self {
            method: method.unwrap_or_else(|| "GET".into()),
            content_type,
            body,
            truncated,
        })
    }

    fn is_post(&self) -> bool {
        self.method.eq_ignore_ascii_case("POST")
    }

    /// Whether this is a POST with a form field named exactly `sites`.
    pub async fn wants_sites(&self) -> bool {
        if !self.is_post() {
            return false;
        }
        let content_type = self
            .content_type
            .as_deref()
            .unwrap_or("application/x-www-form-urlencoded");

        if content_type
            .to_ascii_lowercase()
            .starts_with("multipart/form-data")
        {
            return self.multipart_has_sites(content_type).await;
        }
        url::form_urlencoded::parse(&self.body).any(|(key, _)| key == "sites")
    }

    async fn multipart_has_sites(&self, content_type: &str) -> bool {
        let boundary = match multer::parse_boundary(content_type) {
            Ok(boundary) => boundary,
            Err(err) => {
                debug!(error = %err, "multipart body without a usable boundary");
                return false;
            }
        };
        let body = Bytes::from(self.body.clone());
        let mut multipart = multer::Multipart::new(
            stream::iter([Ok::<_, Infallible>(body)]),
            boundary,
        );

        loop {
            match multipart.next_field().await {
                Ok(Some(field)) if field.name() == Some("sites") => return true,
                Ok(Some(_)) => {}
                Ok(None) => return false,
                Err(err) => {
                    debug!(error = %err, "malformed multipart body");
                    return false;
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CgiResponse {
    pub content_type: &'static str,
    pub body: String,
}

impl CgiResponse {
    fn json(body: String) -> Self {
        Self {
            content_type: "application/json",
            body,
        }
    }

    fn html() -> Self {
        Self {
            content_type: "text/html; charset=utf-8",
            body: INDEX_HTML.to_owned(),
        }
    }

    fn error(message: String) -> Self {
        let body = output::render_json_pretty(&ErrorBody { error: message })
            .unwrap_or_else(|_| r#"{"error": "internal error"}"#.to_owned());
        Self::json(body)
    }

    /// Write CGI headers, a blank line, then the body.
    pub fn write_to(&self, mut out: impl Write) -> io::Result<()> {
        write!(out, "Content-Type: {}\r\n\r\n", self.content_type)?;
        out.write_all(self.body.as_bytes())?;
        writeln!(out)?;
        out.flush()
    }
}

/// Build the response for `req`. `connect` is only called for the JSON
/// branch, so the HTML page never needs credentials.
pub async fn respond(
    req: &CgiRequest,
    connect: impl FnOnce() -> Result<WpEngineClient, CliError>,
) -> CgiResponse {
    if req.is_post() && req.truncated {
        return CgiResponse::error(format!(
            "request body is larger than the {MAX_BODY} byte limit"
        ));
    }
    if !req.wants_sites().await {
        debug!(method = %req.method, "serving placeholder page");
        return CgiResponse::html();
    }

    let client = match connect() {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "cannot build API client");
            return CgiResponse::error(err.to_string());
        }
    };

    match client.list_sites().await {
        Ok(listing) => match output::render_json_pretty(&listing) {
            Ok(body) => CgiResponse::json(body),
            Err(err) => CgiResponse::error(err.to_string()),
        },
        Err(err) => {
            warn!(error = %err, "site listing failed");
            CgiResponse::error(ErrorBody::from(&err).error)
        }
    }
}

/// Entry point for `wpe cgi`.
pub async fn handle(
    connect: impl FnOnce() -> Result<WpEngineClient, CliError>,
) -> Result<(), CliError> {
    let req = CgiRequest::from_env(io::stdin().lock())?;
    let resp = respond(&req, connect).await;
    resp.write_to(io::stdout().lock())?;
    Ok(())
}
