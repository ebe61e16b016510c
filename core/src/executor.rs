//! Request execution: URL resolution, dispatch, outcome classification and
//! failure wrapping.
//!
//! # Design
//! `Executor::execute` is split the same way as the rest of the crate:
//! `build_request` turns a verb, path and payload into an `HttpRequest`
//! without I/O, the `Transport` performs the single exchange, and
//! `classify` maps the `HttpResponse` to a decoded body or a `Failure`.
//! Every `Failure` leaves the executor wrapped in `ClientError::Request`
//! with the verb, URL and payload that produced it.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Failure, Result};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport, Verb};
use crate::target::Target;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Sends verb+path+payload requests against a fixed `Target`.
#[derive(Debug, Clone)]
pub struct Executor<T = UreqTransport> {
    target: Target,
    transport: T,
}

impl Executor<UreqTransport> {
    /// Executor over `ureq` with the target and timeout from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.target()?,
            UreqTransport::new(config.timeout()),
        ))
    }
}

impl<T: Transport> Executor<T> {
    pub fn new(target: Target, transport: T) -> Self {
        Self { target, transport }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `verb` without sending it.
    ///
    /// JSON verbs carry the payload as the body (`null` when absent). Plain
    /// verbs carry an object payload as query parameters and reject any
    /// other payload shape.
    pub fn build_request(&self, verb: Verb, path: &str, payload: Option<&Value>) -> Result<HttpRequest> {
        let mut url = self.target.resolve(path);

        if verb.is_json() {
            let body = serde_json::to_string(payload.unwrap_or(&Value::Null))?;
            return Ok(HttpRequest {
                method: verb.method(),
                url: url.into(),
                headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
                body: Some(body),
            });
        }

        match payload {
            None | Some(Value::Null) => {}
            Some(Value::Object(fields)) => {
                let params: Vec<(&String, String)> = fields
                    .iter()
                    .filter_map(|(name, value)| query_value(value).map(|v| (name, v)))
                    .collect();
                if !params.is_empty() {
                    url.query_pairs_mut().extend_pairs(params);
                }
            }
            Some(other) => {
                return Err(ClientError::InvalidPayload(format!(
                    "{verb} sends its payload as query parameters and needs an object, got {}",
                    payload_text(Some(other))
                )));
            }
        }

        Ok(HttpRequest {
            method: verb.method(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    /// Perform one request and return the decoded success body.
    pub fn execute(&self, verb: Verb, path: &str, payload: Option<&Value>) -> Result<Value> {
        let request = self.build_request(verb, path, payload)?;
        // Error context carries the URL without the query; the payload is
        // reported as `data`.
        let url = self.target.resolve(path);
        debug!(%verb, method = request.method.as_str(), %url, "sending metrics request");

        let outcome = self
            .transport
            .send(&request)
            .and_then(|response| classify(&response));

        match outcome {
            Ok(body) => {
                debug!(%verb, %url, "metrics request succeeded");
                Ok(body)
            }
            Err(failure) => {
                warn!(%verb, %url, error = %failure, "metrics request failed");
                Err(ClientError::Request {
                    verb,
                    url: url.into(),
                    data: payload_text(payload),
                    source: failure,
                })
            }
        }
    }
}

/// Map a response to its decoded body, or to an application failure when
/// the status is not 2xx.
pub fn classify(response: &HttpResponse) -> std::result::Result<Value, Failure> {
    let body = decode_body(response);
    if response.is_success() {
        return Ok(body);
    }
    Err(Failure::Application {
        status: response.status,
        detail: pretty(&body),
    })
}

/// An empty body decodes to `null`. JSON responses decode to their value;
/// non-JSON content types and unparseable bodies become a JSON string
/// holding the raw text.
fn decode_body(response: &HttpResponse) -> Value {
    let body = response.body.as_str();
    if body.trim().is_empty() {
        return Value::Null;
    }
    if !response.is_json() {
        return Value::String(body.to_string());
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Text form of a payload for error context: strings verbatim, everything
/// else as compact JSON.
pub fn payload_text(payload: Option<&Value>) -> String {
    match payload {
        None => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn pretty(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
