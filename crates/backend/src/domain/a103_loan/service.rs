use contracts::domain::a103_loan::aggregate::{Loan, LoanDto};
use contracts::domain::common::SheetId;

use super::{repository, u601_sheet_migration};
use crate::shared::data::db::get_connection;

fn client_sheet_id(dto: &LoanDto) -> Option<&str> {
    dto.sheet_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub async fn create(dto: LoanDto) -> anyhow::Result<String> {
    let store = u601_sheet_migration::store(get_connection().clone());
    let values = u601_sheet_migration::field_values(&dto.fields);
    let record = store
        .create(&values, client_sheet_id(&dto).map(SheetId::pending), false)
        .await?;
    tracing::info!("Loan {} created", record.id);
    Ok(record.id)
}

pub async fn update(dto: LoanDto) -> anyhow::Result<()> {
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

pub async fn get_by_id(id: &str) -> anyhow::Result<Option<Loan>> {
    repository::get_by_id(id).await
}

/// All loans, or those of one borrower
pub async fn list(borrower_id: Option<&str>) -> anyhow::Result<Vec<Loan>> {
    match borrower_id {
        Some(borrower_id) => repository::list_by_borrower(borrower_id).await,
        None => repository::list_all().await,
    }
}
