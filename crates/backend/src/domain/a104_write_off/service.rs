use contracts::domain::a104_write_off::aggregate::{WriteOff, WriteOffDto};
use contracts::domain::common::SheetId;

use super::{repository, u601_sheet_migration};
use crate::shared::data::db::get_connection;

fn client_sheet_id(dto: &WriteOffDto) -> Option<&str> {
    dto.sheet_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub async fn create(dto: WriteOffDto) -> anyhow::Result<String> {
    let store = u601_sheet_migration::store(get_connection().clone());
    let values = u601_sheet_migration::field_values(&dto.fields);
    let record = store
        .create(&values, client_sheet_id(&dto).map(SheetId::pending), false)
        .await?;
    tracing::info!("Write-off {} created", record.id);
    Ok(record.id)
}

pub async fn update(dto: WriteOffDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Missing ID"))?;
    let store = u601_sheet_migration::store(get_connection().clone());
    let existing = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    store
        .update_fields(id, &u601_sheet_migration::field_values(&dto.fields))
        .await?;
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

pub async fn get_by_id(id: &str) -> anyhow::Result<Option<WriteOff>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<WriteOff>> {
    repository::list_all().await
}
