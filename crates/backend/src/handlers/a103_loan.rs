use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::domain::a103_loan;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "borrowerId")]
    pub borrower_id: Option<String>,
}

/// GET /jf/loans?borrowerId=
pub async fn list_all(
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<contracts::domain::a103_loan::aggregate::Loan>>, axum::http::StatusCode> {
    let borrower_id = query
        .borrower_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match a103_loan::service::list(borrower_id).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list loans: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /jf/loans/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a103_loan::aggregate::Loan>, axum::http::StatusCode> {
    match a103_loan::service::get_by_id(&id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load loan {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /jf/loans
///
/// Creates or updates; either way the record waits for the next sync.
pub async fn upsert(
    Json(dto): Json<contracts::domain::a103_loan::aggregate::LoanDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a103_loan::service::update(dto).await.map(|_| id),
        None => a103_loan::service::create(dto).await,
    };
    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save loan: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /jf/loans/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    match a103_loan::service::delete(&id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete loan {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
