use async_trait::async_trait;
use contracts::domain::common::SheetId;

use crate::shared::field_mapper::FieldValues;

/// A sheet-linked row of the relational store, with its business fields
/// keyed by store field name
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub id: String,
    pub sheet_id: Option<SheetId>,
    pub synced: bool,
    pub values: FieldValues,
}

/// Typed persistence for one reconciled entity
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count(&self) -> anyhow::Result<u64>;

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<StoreRecord>>;

    /// Record linked to `sheet_id`, durable or pending
    async fn find_by_sheet_id(&self, sheet_id: &str) -> anyhow::Result<Option<StoreRecord>>;

    /// Records waiting for export, oldest first, optionally narrowed to one
    /// correlation key value
    async fn find_unsynced(&self, correlation: Option<&str>) -> anyhow::Result<Vec<StoreRecord>>;

    /// Insert a record. Values whose type does not fit the column are
    /// stored as null.
    async fn create(
        &self,
        values: &FieldValues,
        sheet_id: Option<SheetId>,
        synced: bool,
    ) -> anyhow::Result<StoreRecord>;

    /// Overwrite the given fields only
    async fn update_fields(&self, id: &str, values: &FieldValues) -> anyhow::Result<()>;

    async fn update_sync_status(&self, id: &str, synced: bool) -> anyhow::Result<()>;

    async fn set_sheet_id(&self, id: &str, sheet_id: SheetId) -> anyhow::Result<()>;
}
