//! Domain DTOs for the metrics service.
//!
//! # Design
//! The record payload is opaque to the client, so `Record::data` and every
//! response body are `serde_json::Value`. The mock server keeps its own
//! copies of these shapes; integration tests catch drift between the two.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One report sent for a metric record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// ISO 8601 UTC timestamp with millisecond precision, e.g.
    /// `2024-05-01T12:00:00.000Z`.
    pub created: String,
    pub data: Value,
}

impl Record {
    /// Wrap `data` in a record stamped with the current time.
    pub fn now(data: Value) -> Self {
        Self {
            created: timestamp(),
            data,
        }
    }
}

/// Admin credentials, passed through as request data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Body returned by the create endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateResponse {
    pub id: String,
}

/// Current time in the service's timestamp format.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
