use axum::{extract::Path, Json};
use serde_json::json;

use crate::domain::a104_write_off;

/// GET /jf/write-offs
pub async fn list_all() -> Result<
    Json<Vec<contracts::domain::a104_write_off::aggregate::WriteOff>>,
    axum::http::StatusCode,
> {
    match a104_write_off::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list write-offs: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /jf/write-offs/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a104_write_off::aggregate::WriteOff>, axum::http::StatusCode> {
    match a104_write_off::service::get_by_id(&id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load write-off {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /jf/write-offs
///
/// Creates or updates; either way the record waits for the next sync.
pub async fn upsert(
    Json(dto): Json<contracts::domain::a104_write_off::aggregate::WriteOffDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a104_write_off::service::update(dto).await.map(|_| id),
        None => a104_write_off::service::create(dto).await,
    };
    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save write-off: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /jf/write-offs/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    match a104_write_off::service::delete(&id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete write-off {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
