//! Spreadsheet gateway: read/write access to named sheets of the legacy
//! spreadsheet.
//!
//! Every `get_all` call re-reads live data. The only cache is the header
//! cache behind [`SheetGateway::find_row_number`].

pub mod a1;
pub mod google;
pub mod memory;
pub mod record;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::shared::config::{SheetsBackend, SheetsConfig};

pub use record::{SheetRecord, SheetTable};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Sheets API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from Sheets API: {0}")]
    InvalidResponse(String),

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Sheet '{0}' has no ID column")]
    NoIdColumn(String),

    #[error("Sheets configuration error: {0}")]
    Config(String),
}

/// How a write addresses its target row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowLocator {
    /// Physical 1-based row number
    Row(u32),
    /// Logical identifier, resolved by scanning the ID column
    Id(String),
}

impl std::fmt::Display for RowLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowLocator::Row(n) => write!(f, "row {}", n),
            RowLocator::Id(id) => write!(f, "ID {}", id),
        }
    }
}

/// Access to the named sheets of one spreadsheet
#[async_trait]
pub trait SheetGateway: Send + Sync {
    /// Header row plus all data rows, fetched live
    async fn get_all(&self, sheet: &str) -> Result<SheetTable, SheetError>;

    /// Header row, served from a TTL cache when fresh
    async fn get_headers(&self, sheet: &str) -> Result<Vec<String>, SheetError>;

    /// Cells of one column from row 2 down, fetched live
    async fn get_column(&self, sheet: &str, index: usize) -> Result<Vec<String>, SheetError>;

    /// Append a row after the last one; returns its row number.
    /// `None` cells are left blank.
    async fn append(&self, sheet: &str, values: Vec<Option<String>>) -> Result<u32, SheetError>;

    /// Overwrite a row; `None` cells are left untouched so formula cells
    /// survive. Returns the physical row written.
    async fn update(
        &self,
        sheet: &str,
        locator: RowLocator,
        values: Vec<Option<String>>,
    ) -> Result<u32, SheetError>;

    /// Blank a row in place. Later rows keep their numbers.
    async fn clear(&self, sheet: &str, locator: RowLocator) -> Result<u32, SheetError>;

    /// Physical row holding `id`, via the cached header and a live read of
    /// the ID column. The first match wins; duplicates are logged.
    async fn find_row_number(&self, sheet: &str, id: &str) -> Result<Option<u32>, SheetError> {
        let headers = self.get_headers(sheet).await?;
        let id_index = record::id_column_index(&headers)
            .ok_or_else(|| SheetError::NoIdColumn(sheet.to_string()))?;
        let column = self.get_column(sheet, id_index).await?;
        let wanted = id.trim();
        let mut matches = column
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.trim() == wanted)
            .map(|(offset, _)| offset as u32 + 2);
        let first = matches.next();
        let extra: Vec<u32> = matches.collect();
        if let Some(row) = first {
            if !extra.is_empty() {
                tracing::warn!(
                    "Sheet '{}': ID {} appears on rows {} and {:?}, using row {}",
                    sheet,
                    wanted,
                    row,
                    extra,
                    row
                );
            }
        }
        Ok(first)
    }

    /// Resolve a locator to a physical row number
    async fn resolve(&self, sheet: &str, locator: &RowLocator) -> Result<u32, SheetError> {
        match locator {
            RowLocator::Row(n) => Ok(*n),
            RowLocator::Id(id) => self
                .find_row_number(sheet, id)
                .await?
                .ok_or_else(|| SheetError::RowNotFound(format!("{} in '{}'", id, sheet))),
        }
    }
}

/// Build the gateway selected in configuration
pub fn build_gateway(config: &SheetsConfig) -> anyhow::Result<Arc<dyn SheetGateway>> {
    match config.backend {
        SheetsBackend::Google => {
            let client = google::GoogleSheetsClient::from_config(config)?;
            tracing::info!(
                "Sheets gateway: Google Sheets, spreadsheet {}",
                config.spreadsheet_id
            );
            Ok(Arc::new(client))
        }
        SheetsBackend::Memory => {
            tracing::warn!("Sheets gateway: in-memory (data is lost on restart)");
            Ok(Arc::new(memory::InMemorySheets::new()))
        }
    }
}
