//! Error types for the metrics client.
//!
//! # Design
//! Remote failures are split in two layers. `Failure` is the raw outcome of
//! a single HTTP exchange that did not succeed: the server answered with a
//! non-2xx status, the connection broke, or the time budget ran out.
//! `ClientError::Request` wraps a `Failure` together with the verb, the
//! resolved URL and the payload text, so a caller always sees which call
//! failed. The raw `Failure` stays reachable through `Error::source`.
//!
//! Everything else in `ClientError` is a local failure detected before or
//! after the exchange and never carries a `Failure`.

use std::time::Duration;

use thiserror::Error;

use crate::http::Verb;

/// Result type for metrics client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Outcome of an HTTP exchange that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// The server responded but signaled failure. `detail` is the response
    /// body, pretty-printed when it is JSON.
    #[error("HTTP {status}: {detail}")]
    Application { status: u16, detail: String },

    /// The connection could not be completed or broke mid-exchange.
    #[error("transport error: {0}")]
    Transport(String),

    /// The exchange did not complete within the time budget.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl Failure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Failure::Timeout(_))
    }

    /// Status code of an application failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by `MetricsClient`, `ReportClient` and `Executor`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A request reached the wire and failed. `url` is rendered as
    /// `verb:url` to match the service's log format.
    #[error("error during REST request. url={verb}:{url}, data={data}")]
    Request {
        verb: Verb,
        url: String,
        data: String,
        #[source]
        source: Failure,
    },

    /// The create endpoint answered 2xx without a usable `id`.
    #[error("invalid create response: {0}")]
    InvalidCreateResponse(String),

    /// The target address could not be parsed into an absolute URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The payload cannot be sent with the requested verb.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A record ID supplied by the caller is unusable.
    #[error("invalid record id: {0}")]
    InvalidId(String),

    /// The client already holds a record ID.
    #[error("record id already assigned: {0}")]
    IdAlreadyAssigned(String),

    /// Configuration failed to load or validate.
    #[error("invalid config: {0}")]
    Config(String),
}

impl ClientError {
    /// The underlying failure of a wrapped request error.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ClientError::Request { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.failure().is_some_and(Failure::is_timeout)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn request_error_message_names_verb_and_url() {
        let err = ClientError::Request {
            verb: Verb::PutJson,
            url: "http://127.0.0.1:3030/metrics/v1/abc".to_string(),
            data: r#"{"foo":1}"#.to_string(),
            source: Failure::Transport("connection refused".to_string()),
        };
        assert_eq!(
            err.to_string(),
            r#"error during REST request. url=putJson:http://127.0.0.1:3030/metrics/v1/abc, data={"foo":1}"#
        );
    }

    #[test]
    fn request_error_exposes_failure_as_source() {
        let err = ClientError::Request {
            verb: Verb::Get,
            url: "http://localhost/x".to_string(),
            data: "null".to_string(),
            source: Failure::Application {
                status: 500,
                detail: "boom".to_string(),
            },
        };
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "HTTP 500: boom");
        assert_eq!(err.failure().and_then(Failure::status), Some(500));
        assert!(!err.is_timeout());
    }

    #[test]
    fn timeout_is_not_an_application_failure() {
        let failure = Failure::Timeout(Duration::from_secs(10));
        assert!(failure.is_timeout());
        assert_eq!(failure.status(), None);
    }

    #[test]
    fn local_errors_have_no_failure() {
        let err = ClientError::InvalidCreateResponse("{}".to_string());
        assert!(err.failure().is_none());
        assert!(err.source().is_none());
    }
}
