use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use shuttle_axum::axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::pipeline::{Pipeline, PipelineError};
use crate::store::{status, JobRecord, JobStats, JobStore, DEFAULT_LIST_LIMIT};

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    fn store(&self) -> &Arc<dyn JobStore> {
        self.pipeline.store()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/{id}", get(get_job))
        .route("/api/jobs/{id}/status", post(update_status))
        .route("/api/scrape", post(scrape))
        .route("/api/stats", get(stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Failure payload shared by every handler: `{success: false, error}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{e:#}"), "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{e:#}"),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        let status = match e {
            PipelineError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %e, "scrape request failed");
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobRecord>>, ApiError> {
    Ok(Json(state.store().list(DEFAULT_LIST_LIMIT)?))
}

/// Unknown ids answer 200 with `{}`.
async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = match state.store().get(&id)? {
        Some(record) => serde_json::to_value(record).map_err(anyhow::Error::from)?,
        None => json!({}),
    };
    Ok(Json(body))
}

#[derive(Debug, Default, Deserialize)]
struct StatusReq {
    #[serde(default)]
    status: Option<String>,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    // empty or non-JSON bodies fall back to the default status
    let req: StatusReq = serde_json::from_slice(&body).unwrap_or_default();
    let new_status = req
        .status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| status::APPLIED.to_string());
    let success = state.store().update_status(&id, &new_status)?;
    tracing::info!(%id, status = %new_status, success, "status update");
    Ok(Json(json!({ "success": success })))
}

async fn scrape(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let summary = state.pipeline.run_once().await?;
    Ok(Json(json!({
        "success": true,
        "jobs_found": summary.jobs_found,
        "new_jobs": summary.new_jobs,
        "message": format!(
            "Found {} matching jobs, {} new",
            summary.jobs_found, summary.new_jobs
        ),
    })))
}

async fn stats(State(state): State<AppState>) -> Result<Json<JobStats>, ApiError> {
    Ok(Json(state.store().stats()?))
}
