use contracts::usecases::u601_sheet_migration::{ImportResult, RowError, RowSkip};

/// What happened to one sheet row during import
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Imported,
    Updated,
    Skipped(String),
    Failed(String),
}

/// Accumulates row outcomes into the import summary
#[derive(Debug, Default)]
pub struct ImportTally {
    result: ImportResult,
}

impl ImportTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: &str, row_number: u32, outcome: RowOutcome) {
        let r = &mut self.result;
        match outcome {
            RowOutcome::Imported => r.imported += 1,
            RowOutcome::Updated => r.updated += 1,
            RowOutcome::Skipped(reason) => {
                r.skipped += 1;
                r.skipped_details.push(RowSkip {
                    id: id.to_string(),
                    row_number: Some(row_number),
                    reason,
                });
            }
            RowOutcome::Failed(error) => {
                r.errors += 1;
                r.error_details.push(RowError {
                    id: id.to_string(),
                    row_number: Some(row_number),
                    error,
                });
            }
        }
    }

    pub fn finish(self) -> ImportResult {
        self.result
    }
}
