use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use uuid::Uuid;

use super::models::{AcceptedResponse, WebhookRequest};
use super::pipeline::PipelineRunner;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub runner: PipelineRunner,
    pub user_secret: String,
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api-endpoint", post(receive_request))
        .route("/jobs/{id}", get(get_job))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({"message": "Pagesmith API is running!"}))
}

async fn health_check() -> &'static str {
    "ok"
}

/// Validate the webhook and hand it to the background pipeline.
///
/// The body is parsed by hand so malformed JSON is a 400 and a bad secret is
/// a 401 before any field validation happens.
async fn receive_request(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON format.".to_string()))?;

    let secret = value.get("secret").and_then(|s| s.as_str());
    if secret != Some(state.user_secret.as_str()) {
        tracing::warn!("rejected webhook with invalid secret");
        return Err(ApiError::Unauthorized("Invalid secret.".to_string()));
    }

    let request: WebhookRequest = serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request: {}", e)))?;

    let task = request.task.clone();
    let job_id = state.runner.start(request);
    tracing::info!(task = %task, job_id = %job_id, "request accepted");

    Ok(Json(AcceptedResponse {
        status: "success".to_string(),
        message: "Request accepted and is being processed in the background.".to_string(),
        task_received: task,
        job_id,
    }))
}

async fn get_job(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid job id '{}'", id)))?;
    state
        .runner
        .jobs()
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {} not found", id)))
}

// ── Tests ─────────────────────────────────────────────────────────────
