use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::printer::content_handler;
use super::{with_cors, ApiState};
use crate::error::SpoolError;
use crate::store::JobStore;

#[derive(Serialize)]
struct LatestResponse {
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_filename: Option<String>,
}

/// The display-side HTTP surface: the polling page and the endpoints it
/// drives itself from.
pub fn display_router(state: ApiState) -> Router {
    let router = Router::new()
        .route("/", get(index_handler))
        .route("/api/latest", get(latest_handler))
        .route("/print_content/{id}", get(content_handler))
        .route("/qr/{id}", get(qr_handler));
    with_cors(router, state)
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

/// Latest-job query. Always answers 200 so the polling page retries quietly;
/// an id whose blobs have not all landed yet reports as not existing.
async fn latest_handler(State(state): State<ApiState>) -> Json<LatestResponse> {
    let latest = state.spooler.latest();
    match latest.id {
        Some(id) if latest.available => Json(LatestResponse {
            exists: true,
            file_number: Some(id),
            filename: Some(JobStore::artifact_filename(id)),
            content_filename: Some(JobStore::content_filename(id)),
        }),
        _ => Json(LatestResponse {
            exists: false,
            file_number: None,
            filename: None,
            content_filename: None,
        }),
    }
}

async fn qr_handler(State(state): State<ApiState>, Path(id): Path<u64>) -> impl IntoResponse {
    match state.spooler.artifact(id) {
        Ok(bytes) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], bytes).into_response()
        }
        Err(SpoolError::JobNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "QR code not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
