//! HTTP surface over a [`Pipeline`]. Routing only; all decisions are made by
//! the core and forwarded verbatim.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use blockstage_core::{MergeError, MergeReport, Pipeline, StageError};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

pub const FILE_NAME_REQUIRED: &str = "file name required";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequest {
    #[serde(default)]
    pub file_name: Option<String>,
}

impl FileRequest {
    /// An unreadable body (empty, not JSON, wrong content type) carries no name.
    fn name_from(body: Result<Json<FileRequest>, JsonRejection>) -> Option<String> {
        let Json(req) = body.ok()?;
        req.file_name.filter(|n| !n.is_empty())
    }
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/download/file", post(download_file))
        .route("/download/merge", post(merge_file))
        .route(
            "/notifications",
            get(list_notifications).delete(clear_notifications),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

fn file_name_required() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": FILE_NAME_REQUIRED })),
    )
        .into_response()
}

fn stage_error(e: &StageError) -> Response {
    let status = match e {
        StageError::InvalidFileId(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({ "success": false, "message": e.to_string() })),
    )
        .into_response()
}

fn join_error(e: tokio::task::JoinError) -> Response {
    error!(error = %e, "pipeline task failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "message": "internal error" })),
    )
        .into_response()
}

async fn download_file(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<FileRequest>, JsonRejection>,
) -> Response {
    let Some(name) = FileRequest::name_from(body) else {
        return file_name_required();
    };

    match tokio::task::spawn_blocking(move || pipeline.download_file(&name)).await {
        Ok(Ok(result)) => {
            let status = StatusCode::from_u16(result.status_class.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(result)).into_response()
        }
        Ok(Err(e)) => stage_error(&e),
        Err(e) => join_error(e),
    }
}

async fn merge_file(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<FileRequest>, JsonRejection>,
) -> Response {
    let Some(name) = FileRequest::name_from(body) else {
        return file_name_required();
    };

    let result = match tokio::task::spawn_blocking(move || pipeline.merge_file(&name)).await {
        Ok(result) => result,
        Err(e) => return join_error(e),
    };
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(MergeError::Stage(StageError::InvalidFileId(_))) => StatusCode::BAD_REQUEST,
        Err(MergeError::Stage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        Err(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(MergeReport::from(&result))).into_response()
}

async fn list_notifications(State(pipeline): State<Arc<Pipeline>>) -> Response {
    Json(pipeline.notifications().list()).into_response()
}

async fn clear_notifications(State(pipeline): State<Arc<Pipeline>>) -> StatusCode {
    pipeline.notifications().clear();
    StatusCode::NO_CONTENT
}
