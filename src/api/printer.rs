use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use super::{with_cors, ApiState};
use crate::error::SpoolError;
use crate::store::JobStore;

#[derive(Serialize)]
struct PrintResponse {
    success: bool,
    file_number: u64,
    filename: String,
    content_filename: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[derive(Serialize)]
struct LastQrResponse {
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_filename: Option<String>,
}

/// The submission-side HTTP surface.
pub fn printer_router(state: ApiState) -> Router {
    let router = Router::new()
        .route("/print", post(print_handler))
        .route("/health", get(health_handler))
        .route("/last_qr", get(last_qr_handler))
        .route("/print_content/{id}", get(content_handler));
    with_cors(router, state)
}

/// Accept a print job. The body is either JSON with a `content` (or `text`)
/// field, or raw text.
async fn print_handler(State(state): State<ApiState>, body: Bytes) -> impl IntoResponse {
    let content = extract_content(&body);

    match state.spooler.submit(&content) {
        Ok(receipt) => (
            StatusCode::OK,
            Json(PrintResponse {
                success: true,
                file_number: receipt.id,
                filename: receipt.filename,
                content_filename: receipt.content_filename,
            }),
        )
            .into_response(),
        Err(SpoolError::EmptyContent) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No print content provided".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to process print job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn extract_content(body: &Bytes) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        for field in ["content", "text"] {
            if let Some(text) = value.get(field).and_then(Value::as_str) {
                return text.to_string();
            }
        }
        // JSON without a recognized field prints as-is
        return value.to_string();
    }
    String::from_utf8_lossy(body).into_owned()
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "qrspool",
    })
}

async fn last_qr_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let latest = state.spooler.latest();
    match latest.id {
        Some(id) if latest.available => (
            StatusCode::OK,
            Json(LastQrResponse {
                exists: true,
                file_number: Some(id),
                filename: Some(JobStore::artifact_filename(id)),
                content_filename: Some(JobStore::content_filename(id)),
            }),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(LastQrResponse {
                exists: false,
                file_number: None,
                filename: None,
                content_filename: None,
            }),
        ),
    }
}

pub(super) async fn content_handler(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.spooler.content(id) {
        Ok(content) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "content": content,
                "filename": JobStore::content_filename(id),
            })),
        )
            .into_response(),
        Err(SpoolError::JobNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Content file not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
