use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    pub id: String,
    #[serde(default)]
    pub records: Vec<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct AdminQuery {
    pub username: Option<String>,
    pub password: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<String, MetricRecord>>>;

#[derive(Clone, Default)]
pub struct AppState {
    pub db: Db,
    pub admin: Arc<AdminCredentials>,
    creates: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(admin: AdminCredentials) -> Self {
        Self {
            admin: Arc::new(admin),
            ..Self::default()
        }
    }

    /// Number of create calls served so far.
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/metrics/v1/", post(create_record))
        .route("/metrics/v1/admin", get(list_records))
        .route("/metrics/v1/admin/{id}", get(admin_get_record))
        .route("/metrics/v1/{id}", get(get_record).put(append_record))
        .route("/metrics/v2/{id}", post(report_record))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn create_record(State(state): State<AppState>) -> Json<Created> {
    let id = Uuid::new_v4().to_string();
    state.creates.fetch_add(1, Ordering::SeqCst);
    state.db.write().await.insert(
        id.clone(),
        MetricRecord {
            id: id.clone(),
            records: Vec::new(),
        },
    );
    info!(%id, "created metric record");
    Json(Created { id })
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MetricRecord>, ApiError> {
    let db = state.db.read().await;
    db.get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "record not found"))
}

async fn append_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(record): Json<Value>,
) -> Result<Json<MetricRecord>, ApiError> {
    let mut db = state.db.write().await;
    let stored = db
        .get_mut(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "record not found"))?;
    stored.records.push(record);
    info!(%id, count = stored.records.len(), "appended metric report");
    Ok(Json(stored.clone()))
}

async fn report_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(record): Json<Value>,
) -> Json<MetricRecord> {
    let mut db = state.db.write().await;
    let stored = db.entry(id.clone()).or_insert_with(|| MetricRecord {
        id: id.clone(),
        records: Vec::new(),
    });
    stored.records.push(record);
    info!(%id, count = stored.records.len(), "appended v2 metric report");
    Json(stored.clone())
}

fn authorize(state: &AppState, query: &AdminQuery) -> Result<(), ApiError> {
    let admin = &state.admin;
    if query.username.as_deref() == Some(admin.username.as_str())
        && query.password.as_deref() == Some(admin.password.as_str())
    {
        return Ok(());
    }
    Err(api_error(StatusCode::UNAUTHORIZED, "invalid credentials"))
}

async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    authorize(&state, &query)?;
    let mut ids: Vec<String> = state.db.read().await.keys().cloned().collect();
    ids.sort();
    Ok(Json(ids))
}

async fn admin_get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AdminQuery>,
) -> Result<Json<MetricRecord>, ApiError> {
    authorize(&state, &query)?;
    let db = state.db.read().await;
    db.get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "record not found"))
}
