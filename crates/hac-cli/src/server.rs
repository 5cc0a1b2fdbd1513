use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hac_core::{CoreError, HarmonicSystem, HarmonicVector, SystemStats, VectorRecord};
use hac_store::Store;
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<ServerState>>,
}

struct ServerState {
    system: HarmonicSystem,
    store: Store,
}

impl ServerState {
    /// Persist after a mutation. A failed save is logged, not surfaced, so the
    /// API only ever reports request errors.
    fn save(&self) {
        if let Err(e) = self.store.save_system(&self.system) {
            tracing::error!("failed to save system: {e}");
        }
    }
}

impl AppState {
    pub fn new(system: HarmonicSystem, store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ServerState { system, store })),
        }
    }

    /// Fold the WAL back into the database file before exit.
    pub async fn checkpoint_wal(&self) {
        let state = self.inner.lock().await;
        if let Err(e) = state.store.checkpoint_truncate() {
            tracing::warn!("WAL checkpoint failed: {e}");
            return;
        }
        tracing::info!("WAL checkpoint complete");
    }
}

// --- Errors ---

#[derive(Debug)]
pub enum ApiError {
    BadRequest(CoreError),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::BadRequest(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };
        tracing::debug!("request failed: {message}");
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult = std::result::Result<Json<serde_json::Value>, ApiError>;

// --- Request bodies ---

#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    pub left: usize,
    pub right: usize,
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    pub input: Vec<f64>,
}

// --- Handlers ---

pub async fn add_vector(State(app): State<AppState>, Json(v): Json<HarmonicVector>) -> ApiResult {
    let mut state = app.inner.lock().await;
    let added = state.system.add_vector(v)?;
    if added {
        state.save();
    }
    Ok(Json(serde_json::json!({
        "added": added,
        "size": state.system.space.len(),
    })))
}

pub async fn compose(State(app): State<AppState>, Json(req): Json<ComposeRequest>) -> ApiResult {
    let mut state = app.inner.lock().await;
    let result = state.system.compose_by_index(req.left, req.right)?;
    state.save();
    Ok(Json(serde_json::json!({
        "result": result.map(VectorRecord::from),
        "size": state.system.space.len(),
    })))
}

pub async fn history(State(app): State<AppState>) -> ApiResult {
    let state = app.inner.lock().await;
    Ok(Json(serde_json::json!(state.system.stream.history())))
}

pub async fn basins(State(app): State<AppState>) -> ApiResult {
    let state = app.inner.lock().await;
    Ok(Json(serde_json::json!(state.system.tracker.basin_export())))
}

pub async fn identify(State(app): State<AppState>) -> ApiResult {
    let mut state = app.inner.lock().await;
    let attractor = state.system.identify_attractor();
    if attractor.is_some() {
        state.save();
    }
    Ok(Json(serde_json::json!({
        "attractor": attractor.map(VectorRecord::from),
    })))
}

pub async fn step_state(State(app): State<AppState>, Json(req): Json<StepRequest>) -> ApiResult {
    let mut state = app.inner.lock().await;
    let next = state.system.step_state(&req.input)?;
    state.save();
    Ok(Json(serde_json::json!({
        "state": next,
        "steps": state.system.state.steps(),
    })))
}

pub async fn stats(State(app): State<AppState>) -> Json<SystemStats> {
    let state = app.inner.lock().await;
    Json(state.system.stats())
}

pub fn router(app: AppState) -> Router {
    Router::new()
        .route("/vectors", post(add_vector))
        .route("/compose", post(compose))
        .route("/history", get(history))
        .route("/basins", get(basins))
        .route("/attractor", post(identify))
        .route("/state/step", post(step_state))
        .route("/stats", get(stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

/// Serve the HTTP API until Ctrl-C.
pub async fn serve(addr: SocketAddr, system: HarmonicSystem, store: Store) -> anyhow::Result<()> {
    let app = AppState::new(system, store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(app.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    app.checkpoint_wal().await;
    Ok(())
}
