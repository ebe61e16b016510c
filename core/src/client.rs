//! Record-level operations for the metrics service.
//!
//! # Design
//! Two client types share the `Executor`:
//!
//! - `MetricsClient` speaks the v1 API. It may start without a record ID and
//!   creates one on first use of `get`/`report`, then keeps it for its whole
//!   lifetime. Operations that may assign the ID take `&mut self`, so two
//!   first uses can never race into two creates.
//! - `ReportClient` speaks the v2 API. Its ID is supplied up front and it
//!   only reports.

use serde_json::Value;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::executor::{pretty, Executor};
use crate::http::{Transport, UreqTransport, Verb};
use crate::types::{CreateResponse, Credentials, Record};

const CREATE_PATH: &str = "metrics/v1/";
const ADMIN_PATH: &str = "metrics/v1/admin";

fn record_path(id: &str) -> String {
    format!("metrics/v1/{id}")
}

fn admin_record_path(id: &str) -> String {
    format!("{ADMIN_PATH}/{id}")
}

fn v2_record_path(id: &str) -> String {
    format!("metrics/v2/{id}")
}

/// Client for one metric record on the v1 API.
#[derive(Debug)]
pub struct MetricsClient<T = UreqTransport> {
    id: Option<String>,
    executor: Executor<T>,
}

impl MetricsClient<UreqTransport> {
    /// Client for the configured target. An empty `id` counts as unset.
    pub fn from_config(id: Option<String>, config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(id, Executor::from_config(config)?))
    }

    /// Client for `address` with the default timeout.
    pub fn connect(id: Option<String>, address: &str) -> Result<Self> {
        Self::from_config(id, &ClientConfig::with_address(address))
    }
}

impl Default for MetricsClient<UreqTransport> {
    /// No record ID, default target, default timeout.
    fn default() -> Self {
        Self::new(
            None,
            Executor::new(
                Default::default(),
                UreqTransport::new(ClientConfig::default().timeout()),
            ),
        )
    }
}

impl<T: Transport> MetricsClient<T> {
    pub fn new(id: Option<String>, executor: Executor<T>) -> Self {
        Self {
            id: id.filter(|id| !id.is_empty()),
            executor,
        }
    }

    /// The record ID, once known.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn executor(&self) -> &Executor<T> {
        &self.executor
    }

    /// Create a new record on the server and return its ID.
    ///
    /// The ID is not stored; use `adopt_id` to keep it, or let `get` /
    /// `report` create and store one on demand.
    pub fn create(&self) -> Result<String> {
        let body = self.executor.execute(Verb::Post, CREATE_PATH, None)?;
        match serde_json::from_value::<CreateResponse>(body.clone()) {
            Ok(CreateResponse { id }) if !id.is_empty() => Ok(id),
            _ => Err(ClientError::InvalidCreateResponse(pretty(&body))),
        }
    }

    /// Store an ID obtained from `create`. Fails if one is already held.
    pub fn adopt_id(&mut self, id: impl Into<String>) -> Result<()> {
        if let Some(current) = &self.id {
            return Err(ClientError::IdAlreadyAssigned(current.clone()));
        }
        let id = id.into();
        if id.is_empty() {
            return Err(ClientError::InvalidId("record id must not be empty".into()));
        }
        self.id = Some(id);
        Ok(())
    }

    /// List all record IDs. Requires admin credentials.
    pub fn get_all(&self, credentials: &Credentials) -> Result<Value> {
        let payload = serde_json::to_value(credentials)?;
        self.executor.execute(Verb::Get, ADMIN_PATH, Some(&payload))
    }

    /// Fetch any record by ID. Requires admin credentials.
    pub fn get_one(&self, id: &str, credentials: &Credentials) -> Result<Value> {
        let payload = serde_json::to_value(credentials)?;
        self.executor
            .execute(Verb::Get, &admin_record_path(id), Some(&payload))
    }

    /// Fetch this client's record, creating it first if needed.
    pub fn get(&mut self) -> Result<Value> {
        let id = self.acquire_id()?;
        self.executor.execute(Verb::Get, &record_path(&id), None)
    }

    /// Report `meta` against this client's record, creating it first if
    /// needed.
    pub fn report(&mut self, meta: Value) -> Result<Value> {
        let record = serde_json::to_value(Record::now(meta))?;
        let id = self.acquire_id()?;
        self.executor
            .execute(Verb::PutJson, &record_path(&id), Some(&record))
    }

    fn acquire_id(&mut self) -> Result<String> {
        if let Some(id) = &self.id {
            return Ok(id.clone());
        }
        let id = self.create()?;
        info!(%id, "created metric record");
        Ok(self.id.insert(id).clone())
    }
}

/// Report-only client for a known record on the v2 API.
#[derive(Debug)]
pub struct ReportClient<T = UreqTransport> {
    id: String,
    executor: Executor<T>,
}

impl ReportClient<UreqTransport> {
    pub fn from_config(id: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        Self::new(id, Executor::from_config(config)?)
    }

    pub fn connect(id: impl Into<String>, address: &str) -> Result<Self> {
        Self::from_config(id, &ClientConfig::with_address(address))
    }
}

impl<T: Transport> ReportClient<T> {
    pub fn new(id: impl Into<String>, executor: Executor<T>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ClientError::InvalidId("report client needs a record id".into()));
        }
        Ok(Self { id, executor })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn report(&self, meta: Value) -> Result<Value> {
        let record = serde_json::to_value(Record::now(meta))?;
        self.executor
            .execute(Verb::PostJson, &v2_record_path(&self.id), Some(&record))
    }
}
