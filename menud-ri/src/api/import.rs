//! Import upload and status API handlers
//!
//! POST /restaurant/import accepts a multipart JSON file upload, validates
//! it (extension, content type, well-formed JSON), persists a pending import
//! run with the document attached and spawns the import job. The run row is
//! the only progress surface; GET /restaurant/import/{id} polls it.

use axum::{
    extract::{Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::import_runs;
use crate::error::{ApiError, ApiResult};
use crate::models::{ImportCounts, ImportRun, ImportRunStatus};
use crate::AppState;

/// POST /restaurant/import response
#[derive(Debug, Serialize)]
pub struct ImportScheduledResponse {
    pub message: String,
    pub import_id: Uuid,
}

/// GET /restaurant/import/{id} response
#[derive(Debug, Serialize)]
pub struct ImportStatusResponse {
    pub id: Uuid,
    pub status: ImportRunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub counts: ImportCounts,
}

const VALID_CONTENT_TYPES: &[&str] = &["application/json", "text/json", "text/plain"];

/// POST /restaurant/import
///
/// Validate the uploaded file and schedule the import job.
pub async fn import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportScheduledResponse>> {
    let mut file: Option<(String, String, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
            let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                ApiError::Unprocessable("File must contain valid JSON content".to_string())
            })?;
            file = Some((filename, content_type, text));
        }
    }

    let Some((filename, content_type, text)) = file else {
        return Err(ApiError::BadRequest(
            "Missing required parameter: file".to_string(),
        ));
    };

    if !filename.to_lowercase().ends_with(".json") {
        return Err(ApiError::Unprocessable(
            "File must be a JSON file (.json extension required)".to_string(),
        ));
    }
    if !VALID_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(ApiError::Unprocessable(
            "File must have a valid JSON content type".to_string(),
        ));
    }
    if serde_json::from_str::<serde_json::Value>(&text).is_err() {
        return Err(ApiError::Unprocessable(
            "File must contain valid JSON content".to_string(),
        ));
    }

    let run = ImportRun::new(Some(text));
    import_runs::create_run(&state.db, &run).await.map_err(ApiError::from)?;

    tracing::info!(run_id = %run.id, filename = %filename, "Import run created");

    // Spawn the import job; its failures are the job's own to record
    let pool = state.db.clone();
    let run_id = run.id;
    tokio::spawn(async move {
        if let Err(e) = crate::jobs::run_import_job(&pool, run_id).await {
            tracing::error!(run_id = %run_id, error = %e, "Import job failed");
        }
    });

    Ok(Json(ImportScheduledResponse {
        message: "Import scheduled to be processed".to_string(),
        import_id: run.id,
    }))
}

/// GET /restaurant/import/{id}
///
/// Poll an import run's status and counters.
pub async fn import_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ImportStatusResponse>> {
    let run = import_runs::load_run(&state.db, id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("Import run not found: {}", id)))?;

    Ok(Json(ImportStatusResponse {
        id: run.id,
        status: run.status,
        started_at: run.started_at,
        finished_at: run.finished_at,
        error_message: run.error_message,
        counts: run.counts,
    }))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/restaurant/import", post(import))
        .route("/restaurant/import/:id", get(import_status))
}
