use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::record::column_index;
use super::{RowLocator, SheetError, SheetGateway, SheetTable};

/// Process-local spreadsheet. Row 1 of every sheet is its header.
///
/// Used for local runs (`sheets.backend = "memory"`) and in tests, where the
/// failure switches and read counter stand in for an unreliable remote.
#[derive(Default)]
pub struct InMemorySheets {
    sheets: RwLock<HashMap<String, Vec<Vec<String>>>>,
    full_reads: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a sheet with the given header and rows
    pub fn put_sheet(&self, sheet: &str, headers: &[&str], rows: Vec<Vec<&str>>) {
        let mut grid = vec![headers.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        grid.extend(
            rows.into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect()),
        );
        self.write_lock().insert(sheet.to_string(), grid);
    }

    /// Set one cell, the way a formula recalculation would
    pub fn set_cell(&self, sheet: &str, row: u32, column: &str, value: &str) -> Result<(), SheetError> {
        let mut sheets = self.write_lock();
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| SheetError::RowNotFound(format!("sheet '{}'", sheet)))?;
        let index = grid
            .first()
            .and_then(|headers| column_index(headers, column))
            .ok_or_else(|| SheetError::RowNotFound(format!("column '{}'", column)))?;
        let cells = row
            .checked_sub(1)
            .and_then(|index| grid.get_mut(index as usize))
            .ok_or_else(|| SheetError::RowNotFound(format!("row {}", row)))?;
        if cells.len() <= index {
            cells.resize(index + 1, String::new());
        }
        cells[index] = value.to_string();
        Ok(())
    }

    /// Snapshot of a physical row
    pub fn row(&self, sheet: &str, row: u32) -> Option<Vec<String>> {
        let sheets = self.read_lock();
        sheets.get(sheet)?.get(row.checked_sub(1)? as usize).cloned()
    }

    /// Number of rows below the header, blank ones included
    pub fn data_row_count(&self, sheet: &str) -> usize {
        self.read_lock()
            .get(sheet)
            .map(|g| g.len().saturating_sub(1))
            .unwrap_or(0)
    }

    /// How many full-sheet reads have been served
    pub fn full_reads(&self) -> usize {
        self.full_reads.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), SheetError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SheetError::Network("simulated read failure".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), SheetError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SheetError::Api {
                status: 429,
                body: "simulated write failure".into(),
            });
        }
        Ok(())
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Vec<Vec<String>>>> {
        self.sheets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<Vec<String>>>> {
        self.sheets.write().unwrap_or_else(|e| e.into_inner())
    }

    fn grid(&self, sheet: &str) -> Vec<Vec<String>> {
        self.read_lock().get(sheet).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl SheetGateway for InMemorySheets {
    async fn get_all(&self, sheet: &str) -> Result<SheetTable, SheetError> {
        self.check_read()?;
        self.full_reads.fetch_add(1, Ordering::SeqCst);
        Ok(SheetTable::from_grid(sheet, self.grid(sheet)))
    }

    async fn get_headers(&self, sheet: &str) -> Result<Vec<String>, SheetError> {
        self.check_read()?;
        Ok(self.grid(sheet).into_iter().next().unwrap_or_default())
    }

    async fn get_column(&self, sheet: &str, index: usize) -> Result<Vec<String>, SheetError> {
        self.check_read()?;
        Ok(self
            .grid(sheet)
            .into_iter()
            .skip(1)
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect())
    }

    async fn append(&self, sheet: &str, values: Vec<Option<String>>) -> Result<u32, SheetError> {
        self.check_write()?;
        let mut sheets = self.write_lock();
        let grid = sheets.entry(sheet.to_string()).or_default();
        grid.push(values.into_iter().map(Option::unwrap_or_default).collect());
        Ok(grid.len() as u32)
    }

    async fn update(
        &self,
        sheet: &str,
        locator: RowLocator,
        values: Vec<Option<String>>,
    ) -> Result<u32, SheetError> {
        self.check_write()?;
        let row = self.resolve(sheet, &locator).await?;
        let mut sheets = self.write_lock();
        let cells = sheets
            .get_mut(sheet)
            .zip(row.checked_sub(1))
            .and_then(|(g, index)| g.get_mut(index as usize))
            .ok_or_else(|| SheetError::RowNotFound(format!("{} in '{}'", locator, sheet)))?;
        for (index, value) in values.into_iter().enumerate() {
            if let Some(value) = value {
                if cells.len() <= index {
                    cells.resize(index + 1, String::new());
                }
                cells[index] = value;
            }
        }
        Ok(row)
    }

    async fn clear(&self, sheet: &str, locator: RowLocator) -> Result<u32, SheetError> {
        self.check_write()?;
        let row = self.resolve(sheet, &locator).await?;
        let mut sheets = self.write_lock();
        let cells = sheets
            .get_mut(sheet)
            .zip(row.checked_sub(1))
            .and_then(|(g, index)| g.get_mut(index as usize))
            .ok_or_else(|| SheetError::RowNotFound(format!("{} in '{}'", locator, sheet)))?;
        cells.iter_mut().for_each(String::clear);
        Ok(row)
    }
}
