use axum::{
    extract::{Path, Query},
    routing::{get, post},
    Router,
};
use contracts::domain::common::EntityKind;
use contracts::usecases::u601_sheet_migration::MigrationQuery;

use crate::handlers;
use crate::handlers::u601_sheet_migration as migration;

/// All application routes
pub fn configure_routes() -> Router {
    let mut router = Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // ENTITY CRUD
        // ========================================
        .route(
            "/jf/financial-surveys",
            get(handlers::a101_financial_survey::list_all)
                .post(handlers::a101_financial_survey::upsert),
        )
        .route(
            "/jf/financial-surveys/:id",
            get(handlers::a101_financial_survey::get_by_id)
                .delete(handlers::a101_financial_survey::delete),
        )
        .route(
            "/jf/payroll",
            get(handlers::a102_payroll::list_all).post(handlers::a102_payroll::upsert),
        )
        .route(
            "/jf/payroll/:id",
            get(handlers::a102_payroll::get_by_id).delete(handlers::a102_payroll::delete),
        )
        .route(
            "/jf/loans",
            get(handlers::a103_loan::list_all).post(handlers::a103_loan::upsert),
        )
        .route(
            "/jf/loans/:id",
            get(handlers::a103_loan::get_by_id).delete(handlers::a103_loan::delete),
        )
        .route(
            "/jf/write-offs",
            get(handlers::a104_write_off::list_all).post(handlers::a104_write_off::upsert),
        )
        .route(
            "/jf/write-offs/:id",
            get(handlers::a104_write_off::get_by_id).delete(handlers::a104_write_off::delete),
        );

    // ========================================
    // USECASE u601: SHEET MIGRATION
    // ========================================
    for kind in EntityKind::all() {
        router = router.nest(
            &format!("/jf/{}-migration", kind.slug()),
            migration_routes(kind),
        );
    }
    router
}

/// Migration endpoints of one entity
fn migration_routes(kind: EntityKind) -> Router {
    Router::new()
        .route("/status", get(move || migration::status(kind)))
        .route(
            "/import-from-sheets",
            post(move |query: Query<MigrationQuery>| migration::import_from_sheets(kind, query)),
        )
        .route(
            "/sync-to-sheets",
            post(move |query: Query<MigrationQuery>| migration::sync_to_sheets(kind, query)),
        )
        .route(
            "/full-migration",
            post(move |query: Query<MigrationQuery>| migration::full_migration(kind, query)),
        )
        .route(
            "/compare/:sheet_id",
            get(move |sheet_id: Path<String>| migration::compare(kind, sheet_id)),
        )
        .route("/columns", get(move || migration::columns(kind)))
}
