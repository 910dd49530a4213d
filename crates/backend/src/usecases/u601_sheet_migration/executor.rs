use contracts::domain::common::SheetId;
use contracts::usecases::u601_sheet_migration::{
    ColumnInfo, ColumnsResult, CompareResult, Comparison, FieldDifference, FullMigrationResult,
    ImportResult, MigrationQuery, RowError, SideCount, StatusResult, SyncResult, SyncStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::descriptor::{ExistingRowPolicy, MigrationEntity};
use super::error::MigrationError;
use super::outcome::{ImportTally, RowOutcome};
use super::read_back::{self, ReadBack};
use super::record_store::{RecordStore, StoreRecord};
use crate::shared::field_mapper::{self, FieldValue, FieldValues};
use crate::shared::sheets::record::{format_identifier, identifier_number, EMPTY_MARKER};
use crate::shared::sheets::{RowLocator, SheetGateway, SheetRecord, SheetTable};

/// Currency values closer than this compare equal
const AMOUNT_TOLERANCE: f64 = 0.005;

/// Reconciles one entity between its sheet and its store table
pub struct MigrationExecutor {
    entity: &'static MigrationEntity,
    sheet_name: String,
    sheets: Arc<dyn SheetGateway>,
    store: Arc<dyn RecordStore>,
    read_back_delay: Duration,
    /// Serializes import / export / full-migration runs of this entity
    run_lock: Mutex<()>,
}

/// Where an exported record landed
struct ExportedRow {
    row_number: u32,
    sheet_id: String,
}

impl MigrationExecutor {
    pub fn new(
        entity: &'static MigrationEntity,
        sheet_name: impl Into<String>,
        sheets: Arc<dyn SheetGateway>,
        store: Arc<dyn RecordStore>,
        read_back_delay: Duration,
    ) -> Self {
        Self {
            entity,
            sheet_name: sheet_name.into(),
            sheets,
            store,
            read_back_delay,
            run_lock: Mutex::new(()),
        }
    }

    pub fn entity(&self) -> &'static MigrationEntity {
        self.entity
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn correlation<'q>(&self, query: &'q MigrationQuery) -> Option<&'q str> {
        query.value(self.entity.correlation.query_param)
    }

    async fn read_sheet(&self) -> Result<SheetTable, MigrationError> {
        self.sheets
            .get_all(&self.sheet_name)
            .await
            .map_err(|e| MigrationError::sheet(&self.sheet_name, e))
    }

    /// Record counts on both sides
    pub async fn status(&self) -> Result<StatusResult, MigrationError> {
        let database = self.store.count().await.map_err(MigrationError::Store)?;
        let sheets = self.read_sheet().await?.identified_count() as u64;
        let sync_status = SyncStatus::from_counts(database, sheets);
        tracing::info!(
            "{} status: database {}, sheet {} ({:?})",
            self.entity.kind.display_name(),
            database,
            sheets,
            sync_status
        );
        Ok(StatusResult {
            database: SideCount { total: database },
            sheets: SideCount { total: sheets },
            sync_status,
        })
    }

    /// Sheet -> store
    pub async fn import_from_sheets(
        &self,
        query: &MigrationQuery,
    ) -> Result<ImportResult, MigrationError> {
        let _guard = self.run_lock.lock().await;
        self.run_import(self.correlation(query)).await
    }

    /// Store -> sheet
    pub async fn sync_to_sheets(&self, query: &MigrationQuery) -> Result<SyncResult, MigrationError> {
        let _guard = self.run_lock.lock().await;
        self.run_export(self.correlation(query)).await
    }

    /// Import then export, unless the counts already agree
    pub async fn full_migration(
        &self,
        query: &MigrationQuery,
    ) -> Result<FullMigrationResult, MigrationError> {
        let _guard = self.run_lock.lock().await;
        let status = self.status().await?;
        if status.sync_status == SyncStatus::Synced {
            tracing::info!(
                "{}: already fully synced ({} records)",
                self.entity.kind.display_name(),
                status.database.total
            );
            return Ok(FullMigrationResult::already_synced());
        }
        let correlation = self.correlation(query);
        let import = self.run_import(correlation).await?;
        let export = self.run_export(correlation).await?;
        Ok(FullMigrationResult::combine(import, export))
    }

    async fn run_import(&self, correlation: Option<&str>) -> Result<ImportResult, MigrationError> {
        let table = self.read_sheet().await?;
        let column = self.entity.correlation.sheet_column;
        tracing::info!(
            "Importing {} rows from '{}'{}",
            table.rows.len(),
            self.sheet_name,
            correlation
                .map(|c| format!(" ({} = {})", column, c))
                .unwrap_or_default()
        );

        let mut tally = ImportTally::new();
        let mut seen: HashMap<String, u32> = HashMap::new();

        for row in &table.rows {
            if row.is_empty() {
                tally.push(
                    "",
                    row.row_number,
                    RowOutcome::Skipped("Completely empty record".to_string()),
                );
                continue;
            }
            let Some(id) = row.identifier() else {
                tally.push("", row.row_number, RowOutcome::Skipped("Empty ID".to_string()));
                continue;
            };
            if let Some(first) = seen.get(id) {
                tracing::warn!(
                    "Sheet '{}': duplicate ID {} on rows {} and {}",
                    self.sheet_name,
                    id,
                    first,
                    row.row_number
                );
                tally.push(
                    id,
                    row.row_number,
                    RowOutcome::Skipped(format!("Duplicate ID (first seen on row {})", first)),
                );
                continue;
            }
            seen.insert(id.to_string(), row.row_number);

            if let Some(wanted) = correlation {
                let actual = row.get(column).map(str::trim).unwrap_or("");
                if actual != wanted {
                    tally.push(
                        id,
                        row.row_number,
                        RowOutcome::Skipped(format!(
                            "Correlation key mismatch ({} = '{}')",
                            column, actual
                        )),
                    );
                    continue;
                }
            }

            let outcome = match self.import_row(id, row).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        "Import of {} (row {}) failed: {:#}",
                        id,
                        row.row_number,
                        e
                    );
                    RowOutcome::Failed(e.to_string())
                }
            };
            tally.push(id, row.row_number, outcome);
        }

        let result = tally.finish();
        tracing::info!(
            "{} import: {} imported, {} updated, {} skipped, {} errors",
            self.entity.kind.display_name(),
            result.imported,
            result.updated,
            result.skipped,
            result.errors
        );
        Ok(result)
    }

    async fn import_row(&self, id: &str, row: &SheetRecord) -> anyhow::Result<RowOutcome> {
        let values = field_mapper::sheet_to_store(row, self.entity.fields);
        let Some(existing) = self.store.find_by_sheet_id(id).await? else {
            self.store
                .create(&values, Some(SheetId::durable(id)), true)
                .await?;
            return Ok(RowOutcome::Imported);
        };

        // A client-supplied ID that the sheet actually has is now confirmed
        if !existing.sheet_id.as_ref().is_some_and(SheetId::is_durable) {
            self.store
                .set_sheet_id(&existing.id, SheetId::durable(id))
                .await?;
        }

        match self.entity.existing_row_policy {
            ExistingRowPolicy::UpdateInPlace => {
                self.store.update_fields(&existing.id, &values).await?;
                self.store.update_sync_status(&existing.id, true).await?;
                Ok(RowOutcome::Updated)
            }
            ExistingRowPolicy::SkipExisting => {
                Ok(RowOutcome::Skipped("Already exists".to_string()))
            }
        }
    }

    async fn run_export(&self, correlation: Option<&str>) -> Result<SyncResult, MigrationError> {
        let pending = self
            .store
            .find_unsynced(correlation)
            .await
            .map_err(MigrationError::Store)?;
        if pending.is_empty() {
            tracing::info!("{}: nothing to sync", self.entity.kind.display_name());
            return Ok(SyncResult::default());
        }

        let mut table = self.read_sheet().await?;
        let id_index = table.id_column().ok_or_else(|| {
            MigrationError::Setup(format!("Sheet '{}' has no ID column", self.sheet_name))
        })?;
        tracing::info!(
            "Syncing {} {} records to '{}'",
            pending.len(),
            self.entity.kind.display_name(),
            self.sheet_name
        );

        let mut result = SyncResult::default();
        for record in &pending {
            match self.export_record(&mut table, id_index, record).await {
                Ok(exported) => {
                    result.synced += 1;
                    tracing::debug!(
                        "Record {} written to row {} as {}",
                        record.id,
                        exported.row_number,
                        exported.sheet_id
                    );
                    if self.entity.read_back && self.entity.has_computed_fields() {
                        read_back::schedule(
                            self.sheets.clone(),
                            self.store.clone(),
                            ReadBack {
                                entity: self.entity,
                                sheet_name: self.sheet_name.clone(),
                                sheet_id: exported.sheet_id,
                                record_id: record.id.clone(),
                            },
                            self.read_back_delay,
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("Sync of record {} failed: {:#}", record.id, e);
                    result.errors += 1;
                    result.error_details.push(RowError {
                        id: record.id.clone(),
                        row_number: None,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "{} sync: {} synced, {} errors",
            self.entity.kind.display_name(),
            result.synced,
            result.errors
        );
        Ok(result)
    }

    async fn export_record(
        &self,
        table: &mut SheetTable,
        id_index: usize,
        record: &StoreRecord,
    ) -> anyhow::Result<ExportedRow> {
        let cells = field_mapper::store_to_sheet(&record.values, self.entity.fields);
        let mut row_values = field_mapper::layout_row(&table.headers, &cells);

        if let Some(sheet_id) = record.sheet_id.as_ref().and_then(SheetId::durable_value) {
            match self.sheets.find_row_number(&self.sheet_name, sheet_id).await? {
                Some(row_number) => {
                    self.sheets
                        .update(&self.sheet_name, RowLocator::Row(row_number), row_values.clone())
                        .await?;
                    table.patch_row(row_number, &row_values);
                    self.store.update_sync_status(&record.id, true).await?;
                    return Ok(ExportedRow {
                        row_number,
                        sheet_id: sheet_id.to_string(),
                    });
                }
                None => tracing::warn!(
                    "Sheet ID {} of record {} is no longer in '{}', relinking",
                    sheet_id,
                    record.id,
                    self.sheet_name
                ),
            }
        }

        let (row_number, sheet_id) = match self.find_natural_match(table, record).await? {
            Some((row_number, existing_id)) => {
                let sheet_id = match existing_id {
                    Some(id) => id,
                    None => {
                        let id = self.allocate_identifier(table, record).await?;
                        row_values[id_index] = Some(id.clone());
                        id
                    }
                };
                self.sheets
                    .update(&self.sheet_name, RowLocator::Row(row_number), row_values.clone())
                    .await?;
                table.patch_row(row_number, &row_values);
                (row_number, sheet_id)
            }
            None => {
                let sheet_id = self.allocate_identifier(table, record).await?;
                row_values[id_index] = Some(sheet_id.clone());
                let row_number = self.sheets.append(&self.sheet_name, row_values.clone()).await?;
                table.push_row(
                    row_number,
                    row_values.into_iter().map(Option::unwrap_or_default).collect(),
                );
                (row_number, sheet_id)
            }
        };

        self.store
            .set_sheet_id(&record.id, SheetId::durable(&sheet_id))
            .await?;
        self.store.update_sync_status(&record.id, true).await?;
        Ok(ExportedRow {
            row_number,
            sheet_id,
        })
    }

    /// Next identifier free in the sheet and in the store. A row deleted on
    /// the sheet leaves its ID durably linked to its record.
    async fn allocate_identifier(
        &self,
        table: &SheetTable,
        record: &StoreRecord,
    ) -> anyhow::Result<String> {
        let prefix = self.entity.id_prefix;
        let mut candidate = table.next_identifier(prefix);
        while let Some(holder) = self.store.find_by_sheet_id(&candidate).await? {
            if holder.id == record.id {
                break;
            }
            tracing::warn!(
                "Sheet ID {} is missing from '{}' but still linked to record {}, skipping it",
                candidate,
                self.sheet_name,
                holder.id
            );
            let number = identifier_number(prefix, &candidate).unwrap_or_default();
            candidate = format_identifier(prefix, number + 1);
        }
        Ok(candidate)
    }

    /// Sheet row that already holds this record: same correlation and
    /// discriminator values, and not linked to a different record.
    /// Returns the row number and the row's ID, if it has one.
    async fn find_natural_match(
        &self,
        table: &SheetTable,
        record: &StoreRecord,
    ) -> anyhow::Result<Option<(u32, Option<String>)>> {
        let fields = self.entity.fields;
        let keys = [self.entity.correlation.store_field, self.entity.discriminator];
        let mut wanted = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(spec) = field_mapper::find_by_store_field(fields, key) else {
                return Ok(None);
            };
            match record.values.get(key) {
                Some(value) if !value.is_null() => wanted.push((spec, value)),
                _ => return Ok(None),
            }
        }

        for row in &table.rows {
            let matches = wanted.iter().all(|(spec, value)| {
                row.get(spec.sheet_column)
                    .map(|cell| spec.kind.coerce(&serde_json::Value::String(cell.to_string())))
                    .is_some_and(|cell| values_equal(&cell, value))
            });
            if !matches {
                continue;
            }
            match row.identifier() {
                Some(id) => match self.store.find_by_sheet_id(id).await? {
                    Some(other) if other.id != record.id => {
                        tracing::debug!(
                            "Row {} matches record {} but {} belongs to record {}",
                            row.row_number,
                            record.id,
                            id,
                            other.id
                        );
                        continue;
                    }
                    _ => return Ok(Some((row.row_number, Some(id.to_string())))),
                },
                None => return Ok(Some((row.row_number, None))),
            }
        }
        Ok(None)
    }

    /// Side-by-side view of one sheet row and its record
    pub async fn compare(&self, sheet_id: &str) -> Result<CompareResult, MigrationError> {
        let table = self.read_sheet().await?;
        let row = table.find_by_id(sheet_id).into_iter().next();
        let record = self
            .store
            .find_by_sheet_id(sheet_id)
            .await
            .map_err(MigrationError::Store)?;

        if row.is_none() && record.is_none() {
            return Err(MigrationError::NotFound(format!(
                "Sheet ID {} is neither in '{}' nor in the database",
                sheet_id, self.sheet_name
            )));
        }

        let differences = match (row, &record) {
            (Some(row), Some(record)) => {
                let sheet_values = field_mapper::sheet_to_store(row, self.entity.fields);
                self.differences(&sheet_values, &record.values)
            }
            _ => Vec::new(),
        };

        Ok(CompareResult {
            comparison: Comparison {
                sheets: row.map(SheetRecord::to_json),
                database: record.as_ref().map(record_json),
                differences,
            },
        })
    }

    fn differences(&self, sheet: &FieldValues, store: &FieldValues) -> Vec<FieldDifference> {
        self.entity
            .fields
            .iter()
            .filter_map(|spec| {
                let sheet_value = sheet.get(spec.store_field)?;
                let store_value = store.get(spec.store_field).unwrap_or(&FieldValue::Null);
                if values_equal(sheet_value, store_value) {
                    None
                } else {
                    Some(FieldDifference {
                        field: spec.store_field.to_string(),
                        sheet_value: sheet_value.to_json(),
                        store_value: store_value.to_json(),
                    })
                }
            })
            .collect()
    }

    /// Header names with the first non-blank value under each
    pub async fn columns(&self) -> Result<ColumnsResult, MigrationError> {
        let table = self.read_sheet().await?;
        let columns = table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.trim().is_empty())
            .map(|(index, name)| ColumnInfo {
                name: name.trim().to_string(),
                sample: table
                    .rows
                    .iter()
                    .filter_map(|row| row.values().get(index))
                    .map(|cell| cell.trim())
                    .find(|cell| !cell.is_empty() && *cell != EMPTY_MARKER)
                    .map(str::to_string),
            })
            .collect();
        Ok(ColumnsResult {
            sheet_name: self.sheet_name.clone(),
            columns,
        })
    }
}

fn values_equal(a: &FieldValue, b: &FieldValue) -> bool {
    let number = |v: &FieldValue| match v {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Integer(n) => Some(*n as f64),
        _ => None,
    };
    match (number(a), number(b)) {
        (Some(x), Some(y)) => (x - y).abs() < AMOUNT_TOLERANCE,
        _ => a == b,
    }
}

fn record_json(record: &StoreRecord) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert("id".to_string(), serde_json::Value::String(record.id.clone()));
    map.insert(
        "sheetId".to_string(),
        record
            .sheet_id
            .as_ref()
            .map(|s| serde_json::Value::String(s.as_str().to_string()))
            .unwrap_or(serde_json::Value::Null),
    );
    for (field, value) in record.values.iter() {
        map.insert(field.clone(), value.to_json());
    }
    serde_json::Value::Object(map)
}
