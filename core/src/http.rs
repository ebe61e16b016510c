//! HTTP wire types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The executor builds an
//! `HttpRequest`, hands it to a `Transport`, and classifies the returned
//! `HttpResponse`. `UreqTransport` is the production transport; tests plug
//! in scripted transports so request building and outcome classification
//! are checked without a network.
//!
//! A `Transport` returns `Ok` for every response the server actually sent,
//! whatever its status. Only exchanges that produced no response become
//! `Err(Failure)`.

use std::fmt;
use std::time::Duration;

use crate::error::Failure;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// Operation requested of the executor.
///
/// Plain verbs send their payload as query parameters; the `*Json` verbs
/// send it as a JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    PostJson,
    PutJson,
}

impl Verb {
    pub fn method(self) -> HttpMethod {
        match self {
            Verb::Get => HttpMethod::Get,
            Verb::Post | Verb::PostJson => HttpMethod::Post,
            Verb::PutJson => HttpMethod::Put,
        }
    }

    pub fn is_json(self) -> bool {
        matches!(self, Verb::PostJson | Verb::PutJson)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::PostJson => "postJson",
            Verb::PutJson => "putJson",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data. `url` is absolute and already
/// carries any query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the body should be decoded as JSON. A missing content type
    /// counts as JSON.
    pub fn is_json(&self) -> bool {
        self.header("content-type").map_or(true, |ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
    }
}

/// Executes one `HttpRequest`.
///
/// Implementations perform exactly one exchange per call and never retry.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, Failure>;
}

/// Blocking transport backed by a `ureq` agent with a global timeout.
///
/// The timeout covers the whole exchange, from connecting to reading the
/// last byte of the body.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        // Status codes are classified by the executor, not by ureq.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, err: ureq::Error) -> Failure {
        match err {
            ureq::Error::Timeout(_) => Failure::Timeout(self.timeout),
            other => Failure::Transport(other.to_string()),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, Failure> {
        let url = request.url.as_str();
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            (method, body) => {
                let mut builder = match method {
                    HttpMethod::Put => self.agent.put(url),
                    _ => self.agent.post(url),
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        // No size cap and lossy UTF-8: once a status arrived, only the
        // status decides the outcome.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| self.map_error(e))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
