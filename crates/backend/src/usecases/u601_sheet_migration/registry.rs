use contracts::domain::common::EntityKind;
use once_cell::sync::OnceCell;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::MigrationError;
use super::executor::MigrationExecutor;
use super::record_store::RecordStore;
use crate::domain::{a101_financial_survey, a102_payroll, a103_loan, a104_write_off};
use crate::shared::config::MigrationConfig;
use crate::shared::sheets::SheetGateway;

static EXECUTORS: OnceCell<HashMap<EntityKind, Arc<MigrationExecutor>>> = OnceCell::new();

/// One executor per reconciled entity, all sharing the sheet gateway
pub fn build_executors(
    config: &MigrationConfig,
    sheets: Arc<dyn SheetGateway>,
    db: &DatabaseConnection,
) -> Vec<MigrationExecutor> {
    let stores: [(_, Arc<dyn RecordStore>); 4] = [
        (
            &a101_financial_survey::u601_sheet_migration::ENTITY,
            a101_financial_survey::u601_sheet_migration::store(db.clone()),
        ),
        (
            &a102_payroll::u601_sheet_migration::ENTITY,
            a102_payroll::u601_sheet_migration::store(db.clone()),
        ),
        (
            &a103_loan::u601_sheet_migration::ENTITY,
            a103_loan::u601_sheet_migration::store(db.clone()),
        ),
        (
            &a104_write_off::u601_sheet_migration::ENTITY,
            a104_write_off::u601_sheet_migration::store(db.clone()),
        ),
    ];
    stores
        .into_iter()
        .map(|(entity, store)| {
            MigrationExecutor::new(
                entity,
                config.sheet_names.for_kind(entity.kind),
                sheets.clone(),
                store,
                config.read_back_delay(),
            )
        })
        .collect()
}

pub fn initialize(executors: Vec<MigrationExecutor>) -> anyhow::Result<()> {
    let map: HashMap<EntityKind, Arc<MigrationExecutor>> = executors
        .into_iter()
        .map(|e| (e.entity().kind, Arc::new(e)))
        .collect();
    for (kind, executor) in &map {
        tracing::info!(
            "Migration for {} uses sheet '{}'",
            kind.display_name(),
            executor.sheet_name()
        );
    }
    EXECUTORS
        .set(map)
        .map_err(|_| anyhow::anyhow!("Migration executors already initialized"))
}

pub fn executor(kind: EntityKind) -> Result<Arc<MigrationExecutor>, MigrationError> {
    EXECUTORS
        .get()
        .and_then(|m| m.get(&kind))
        .cloned()
        .ok_or_else(|| MigrationError::Config(format!("no executor for {}", kind.display_name())))
}
