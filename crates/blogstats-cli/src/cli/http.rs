use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use blogstats_core::models::{HottestColumns, RecencyColumns, RecencyUpdate};
use blogstats_core::{StatsError, StatsService, ViewOutcome};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Shared server state. The mutex serializes each read-modify-write cycle within
/// this process; other processes writing the same files can still race.
#[derive(Clone)]
pub struct HTTPServerState {
    pub service: Arc<Mutex<StatsService>>,
}

/// Body of a save notification for a known article
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub fn router(service: Arc<Mutex<StatsService>>) -> Router {
    Router::new()
        .route("/api/hottest", get(get_hottest))
        .route("/api/recently", get(get_recently).post(post_recently))
        .route("/api/articles/:user/:index/register", post(register_article))
        .route("/api/articles/:user/:index/view", post(record_view))
        .route("/api/articles/:user/:index/save", post(record_save))
        .with_state(HTTPServerState { service })
}

/// Start the statistics API server
pub async fn run_server(bind_addr: String, service: StatsService) -> Result<()> {
    let app = router(Arc::new(Mutex::new(service)));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("statistics API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Blocking entry point for the CLI `serve` command
#[tokio::main]
pub async fn serve(bind_addr: String, service: StatsService) -> Result<()> {
    run_server(bind_addr, service).await
}

fn error_response(e: StatsError) -> (StatusCode, String) {
    let status = match e {
        StatsError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        StatsError::InvalidEntry(_) | StatsError::MalformedKey(_) => StatusCode::BAD_REQUEST,
        StatsError::TypeMismatch { .. } | StatsError::CounterOverflow(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("request failed: {}", e);
    } else {
        warn!("request rejected: {}", e);
    }
    (status, e.to_string())
}

/// Handler for GET /api/hottest
async fn get_hottest(State(state): State<HTTPServerState>) -> ApiResult<HottestColumns> {
    let hottest = state.service.lock().leaderboard().map_err(error_response)?;
    Ok(Json(hottest.into()))
}

/// Handler for GET /api/recently
async fn get_recently(State(state): State<HTTPServerState>) -> ApiResult<RecencyColumns> {
    let recents = state.service.lock().recents().map_err(error_response)?;
    Ok(Json(recents.into()))
}

/// Handler for POST /api/recently (raw recency entry, `index` required)
async fn post_recently(
    State(state): State<HTTPServerState>,
    Json(update): Json<RecencyUpdate>,
) -> ApiResult<Value> {
    state.service.lock().save_recent(update).map_err(error_response)?;
    Ok(Json(json!({ "status": "success" })))
}

/// Handler for POST /api/articles/:user/:index/register
async fn register_article(
    Path((user, index)): Path<(String, u64)>,
    State(state): State<HTTPServerState>,
) -> ApiResult<Value> {
    let created = state
        .service
        .lock()
        .register_article(&user, index)
        .map_err(error_response)?;
    Ok(Json(json!({ "created": created })))
}

/// Handler for POST /api/articles/:user/:index/view
async fn record_view(
    Path((user, index)): Path<(String, u64)>,
    State(state): State<HTTPServerState>,
) -> ApiResult<ViewOutcome> {
    let outcome = state
        .service
        .lock()
        .record_view(&user, index)
        .map_err(error_response)?;
    Ok(Json(outcome))
}

/// Handler for POST /api/articles/:user/:index/save
async fn record_save(
    Path((user, index)): Path<(String, u64)>,
    State(state): State<HTTPServerState>,
    Json(request): Json<SaveRequest>,
) -> ApiResult<Value> {
    state
        .service
        .lock()
        .record_save(
            &user,
            index,
            &request.title,
            &request.date,
            &request.preview,
            request.image_urls,
        )
        .map_err(error_response)?;
    Ok(Json(json!({ "status": "success" })))
}
