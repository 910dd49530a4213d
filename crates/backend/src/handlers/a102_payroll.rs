use axum::{extract::Path, Json};
use serde_json::json;

use crate::domain::a102_payroll;

/// GET /jf/payroll
pub async fn list_all() -> Result<
    Json<Vec<contracts::domain::a102_payroll::aggregate::Payroll>>,
    axum::http::StatusCode,
> {
    match a102_payroll::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list payroll: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /jf/payroll/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a102_payroll::aggregate::Payroll>, axum::http::StatusCode> {
    match a102_payroll::service::get_by_id(&id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load payroll line {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /jf/payroll
///
/// Creates or updates; either way the record waits for the next sync.
pub async fn upsert(
    Json(dto): Json<contracts::domain::a102_payroll::aggregate::PayrollDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a102_payroll::service::update(dto).await.map(|_| id),
        None => a102_payroll::service::create(dto).await,
    };
    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save payroll line: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /jf/payroll/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    match a102_payroll::service::delete(&id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete payroll line {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
