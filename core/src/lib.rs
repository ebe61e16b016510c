//! Blocking client for the metrics record service.
//!
//! # Overview
//! Creates, fetches and updates a metric record identified by an opaque ID.
//! Every call resolves a URL from the configured `Target`, sends one HTTP
//! request through a `Transport`, and classifies the outcome. Failures come
//! back as a single `ClientError` carrying the verb, URL and payload of the
//! request, with the raw `Failure` as its source.
//!
//! # Design
//! - `Target` is immutable; each request gets a freshly resolved URL.
//! - `Executor` owns request building, dispatch and classification. It never
//!   retries, and the transport enforces the timeout (10 s by default).
//! - `MetricsClient` (v1 API) creates its record lazily, at most once.
//!   `ReportClient` (v2 API) reports against a record ID known up front.
//! - The transport is a trait so request building and classification are
//!   testable without a network; `UreqTransport` is the real one.
//!
//! ```no_run
//! use metrics_client::{ClientConfig, MetricsClient};
//! use serde_json::json;
//!
//! let mut client = MetricsClient::from_config(None, &ClientConfig::from_env()?)?;
//! client.report(json!({"version": "1.2.0"}))?;
//! # Ok::<(), metrics_client::ClientError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod target;
pub mod types;

pub use client::{MetricsClient, ReportClient};
pub use config::ClientConfig;
pub use error::{ClientError, Failure, Result};
pub use executor::Executor;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport, Verb};
pub use target::Target;
pub use types::{CreateResponse, Credentials, Record};
