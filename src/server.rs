//! HTTP front for the service: upload, status polling and download.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::constants::{DOWNLOAD_FILE_NAME, GZIP_EXTENSION};
use crate::error::SiftError;
use crate::service::SiftService;

#[derive(Clone)]
struct AppState {
    service: Arc<SiftService>,
}

#[derive(Debug, Default, Deserialize)]
struct UploadQuery {
    filename: Option<String>,
}

pub fn router(service: Arc<SiftService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/status/{task_id}", get(status))
        .route("/download/{task_id}", get(download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(AppState { service })
}

pub async fn serve(service: Arc<SiftService>, bind_address: &str, max_upload_bytes: usize) -> Result<()> {
    let app = router(service, max_upload_bytes);

    info!("Starting HTTP server on {}", bind_address);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response {
    let Some(name) = query.filename.as_deref().filter(|name| !name.is_empty()) else {
        return error_body(StatusCode::BAD_REQUEST, "No file selected");
    };
    if !name.to_lowercase().ends_with(GZIP_EXTENSION) {
        warn!(filename = %name, "Rejected upload with invalid extension");
        return error_body(StatusCode::BAD_REQUEST, "File must be a .gz file");
    }
    if body.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "No file provided");
    }

    match state.service.submit_bytes(Some(name), body.to_vec()).await
    {
        Ok(task_id) => Json(json!({
            "task_id": task_id,
            "message": "File uploaded successfully, processing started",
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn status(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    let snapshot = Uuid::parse_str(&task_id)
        .ok()
        .and_then(|id| state.service.poll(id).ok());

    match snapshot {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "not_found", "message": "Task not found" })),
        )
            .into_response(),
    }
}

async fn download(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    let Ok(id) = Uuid::parse_str(&task_id) else {
        return error_body(StatusCode::NOT_FOUND, "File not ready for download");
    };

    match state.service.fetch(id).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub fn status_code(err: &SiftError) -> StatusCode {
    match err {
        SiftError::CorruptInput(_) => StatusCode::BAD_REQUEST,
        SiftError::NotFound(_) | SiftError::NotReady(_) | SiftError::ArtifactMissing(_) => {
            StatusCode::NOT_FOUND
        }
        SiftError::Storage(_) | SiftError::Spawn(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for SiftError {
    fn into_response(self) -> Response {
        if self.is_lookup_error() {
            debug!("Lookup failed: {}", self);
        } else {
            warn!("Request failed: {}", self);
        }

        let message = match &self {
            SiftError::NotFound(_) | SiftError::NotReady(_) => "File not ready for download".to_string(),
            SiftError::ArtifactMissing(_) => "Processed file not found".to_string(),
            other => other.to_string(),
        };
        error_body(status_code(&self), &message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tasks::TaskState;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::tempdir;

    fn state(root: &std::path::Path) -> AppState {
        let mut config = Config::default();
        config.storage.root_directory = root.display().to_string();
        AppState {
            service: Arc::new(SiftService::new(&config)),
        }
    }

    fn gzip(content: &str) -> Bytes {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        Bytes::from(encoder.finish().unwrap())
    }

    fn query(filename: &str) -> Query<UploadQuery> {
        Query(UploadQuery {
            filename: Some(filename.to_string()),
        })
    }

    #[test]
    fn test_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(status_code(&SiftError::CorruptInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_code(&SiftError::NotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_code(&SiftError::NotReady(id)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_code(&SiftError::Spawn("gone".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_requests() {
        let temp_dir = tempdir().unwrap();
        let state = state(temp_dir.path());

        let response = upload(State(state.clone()), query("data.csv"), gzip("a\n1\n")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = upload(State(state.clone()), query("data.gz"), Bytes::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = upload(State(state.clone()), query("data.gz"), Bytes::from_static(b"nope")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(state.service.registry().is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_file_name() {
        let temp_dir = tempdir().unwrap();
        let state = state(temp_dir.path());
        let payload = gzip("header_po,invoice_amount\nPO1,10\n");

        let response = upload(State(state.clone()), Query(UploadQuery::default()), payload.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "No file selected");

        let response = upload(State(state.clone()), query(""), payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(state.service.registry().is_empty());
    }

    #[tokio::test]
    async fn test_status_and_download_flow() {
        let temp_dir = tempdir().unwrap();
        let state = state(temp_dir.path());

        let response = status(State(state.clone()), Path("not-a-uuid".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = upload(
            State(state.clone()),
            query("Invoices.CSV.GZ"),
            gzip("header_po,invoice_amount\nPO1,10\n"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let snapshots = state.service.registry().len();
        assert_eq!(snapshots, 1);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let id = Uuid::parse_str(json["task_id"].as_str().unwrap()).unwrap();

        for _ in 0..500 {
            if state.service.poll(id).unwrap().status == TaskState::Completed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let response = status(State(state.clone()), Path(id.to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = download(State(state.clone()), Path(id.to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"processed_invoice_data.csv\""
        );
    }
}
