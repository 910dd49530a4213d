use contracts::domain::a101_financial_survey::aggregate::{FinancialSurvey, FinancialSurveyDto};
use contracts::domain::common::SheetId;

use super::{repository, u601_sheet_migration};
use crate::shared::data::db::get_connection;
use crate::shared::field_mapper;

fn client_sheet_id(dto: &FinancialSurveyDto) -> Option<&str> {
    dto.sheet_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Create a survey entered outside the sheet. It waits for the next
/// sync-to-sheets run.
pub async fn create(dto: FinancialSurveyDto) -> anyhow::Result<String> {
    let store = u601_sheet_migration::store(get_connection().clone());
    let values = field_mapper::without_computed(
        u601_sheet_migration::field_values(&dto.fields),
        u601_sheet_migration::FIELDS,
    );
    let record = store
        .create(&values, client_sheet_id(&dto).map(SheetId::pending), false)
        .await?;
    tracing::info!("Financial survey {} created", record.id);
    Ok(record.id)
}

/// Overwrite the editable fields and mark the survey for re-sync
pub async fn update(dto: FinancialSurveyDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Missing ID"))?;
    let store = u601_sheet_migration::store(get_connection().clone());
    let existing = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    let values = field_mapper::without_computed(
        u601_sheet_migration::field_values(&dto.fields),
        u601_sheet_migration::FIELDS,
    );
    store.update_fields(id, &values).await?;

    if let Some(sheet_id) = client_sheet_id(&dto) {
        if existing.sheet_id.as_ref().map(SheetId::as_str) != Some(sheet_id) {
            store.set_sheet_id(id, SheetId::pending(sheet_id)).await?;
        }
    }
    store.update_sync_status(id, false).await
}

pub async fn delete(id: &str) -> anyhow::Result<bool> {
    repository::delete(id).await
}

pub async fn get_by_id(id: &str) -> anyhow::Result<Option<FinancialSurvey>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<FinancialSurvey>> {
    repository::list_all().await
}
