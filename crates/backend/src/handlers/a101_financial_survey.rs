use axum::{extract::Path, Json};
use serde_json::json;

use crate::domain::a101_financial_survey;

/// GET /jf/financial-surveys
pub async fn list_all() -> Result<
    Json<Vec<contracts::domain::a101_financial_survey::aggregate::FinancialSurvey>>,
    axum::http::StatusCode,
> {
    match a101_financial_survey::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list financial surveys: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /jf/financial-surveys/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a101_financial_survey::aggregate::FinancialSurvey>, axum::http::StatusCode> {
    match a101_financial_survey::service::get_by_id(&id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load financial survey {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /jf/financial-surveys
///
/// Creates or updates; either way the record waits for the next sync.
pub async fn upsert(
    Json(dto): Json<contracts::domain::a101_financial_survey::aggregate::FinancialSurveyDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a101_financial_survey::service::update(dto).await.map(|_| id),
        None => a101_financial_survey::service::create(dto).await,
    };
    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save financial survey: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /jf/financial-surveys/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    match a101_financial_survey::service::delete(&id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete financial survey {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
