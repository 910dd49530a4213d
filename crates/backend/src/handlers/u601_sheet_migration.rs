use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::common::EntityKind;
use contracts::usecases::common::UseCaseError;
use contracts::usecases::u601_sheet_migration::{
    FailureResponse, MigrationQuery, MigrationResponse,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::usecases::u601_sheet_migration::registry;
use crate::usecases::u601_sheet_migration::{MigrationError, MigrationExecutor};

/// Resolve the executor of `kind`, run `op` on it and wrap the outcome.
/// Always HTTP 200: failures are reported through `success: false`.
async fn run<T, F, Fut>(kind: EntityKind, operation: &str, op: F) -> Response
where
    T: Serialize,
    F: FnOnce(Arc<MigrationExecutor>) -> Fut,
    Fut: Future<Output = Result<T, MigrationError>>,
{
    let result = match registry::executor(kind) {
        Ok(executor) => op(executor).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(body) => Json(MigrationResponse::ok(body)).into_response(),
        Err(e) => {
            tracing::error!("{} {} failed: {:#}", kind.display_name(), operation, e);
            Json(FailureResponse::from(UseCaseError::from(e))).into_response()
        }
    }
}

/// GET /jf/<entity>-migration/status
pub async fn status(kind: EntityKind) -> Response {
    run(kind, "status", |executor| async move { executor.status().await }).await
}

/// POST /jf/<entity>-migration/import-from-sheets
pub async fn import_from_sheets(kind: EntityKind, Query(query): Query<MigrationQuery>) -> Response {
    run(kind, "import", |executor| async move {
        executor.import_from_sheets(&query).await
    })
    .await
}

/// POST /jf/<entity>-migration/sync-to-sheets
pub async fn sync_to_sheets(kind: EntityKind, Query(query): Query<MigrationQuery>) -> Response {
    run(kind, "sync", |executor| async move {
        executor.sync_to_sheets(&query).await
    })
    .await
}

/// POST /jf/<entity>-migration/full-migration
pub async fn full_migration(kind: EntityKind, Query(query): Query<MigrationQuery>) -> Response {
    run(kind, "full migration", |executor| async move {
        executor.full_migration(&query).await
    })
    .await
}

/// GET /jf/<entity>-migration/compare/:sheetId
pub async fn compare(kind: EntityKind, Path(sheet_id): Path<String>) -> Response {
    run(kind, "compare", |executor| async move {
        executor.compare(&sheet_id).await
    })
    .await
}

/// GET /jf/<entity>-migration/columns
pub async fn columns(kind: EntityKind) -> Response {
    run(kind, "columns", |executor| async move { executor.columns().await }).await
}
