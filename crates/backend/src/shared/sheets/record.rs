use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Header names under which the row identifier has historically been stored
pub const ID_COLUMN_ALIASES: &[&str] = &["ID", "Sheet ID", "sheetId", "Id"];

/// Marker some legacy rows carry instead of an empty cell
pub const EMPTY_MARKER: &str = "(empty)";

/// One header-indexed row of a sheet. All cells are strings.
///
/// Cells past the end of `values` are *undefined* (the API drops trailing
/// empty cells), which differs from a defined empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRecord {
    /// 1-based physical row number; the header is row 1
    pub row_number: u32,
    headers: Arc<Vec<String>>,
    values: Vec<String>,
}

impl SheetRecord {
    pub fn new(row_number: u32, headers: Arc<Vec<String>>, values: Vec<String>) -> Self {
        Self {
            row_number,
            headers,
            values,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Cell under `column`, `None` when the column or the cell is undefined
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = column_index(&self.headers, column)?;
        self.values.get(index).map(String::as_str)
    }

    /// Number of cells holding something other than blanks
    pub fn populated_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.trim().is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }

    /// Non-blank identifier from the first ID alias column that has one
    pub fn identifier(&self) -> Option<&str> {
        ID_COLUMN_ALIASES
            .iter()
            .filter_map(|alias| self.get(alias))
            .map(str::trim)
            .find(|v| !v.is_empty() && *v != EMPTY_MARKER)
    }

    /// Header -> cell object for diagnostics
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (index, header) in self.headers.iter().enumerate() {
            if header.trim().is_empty() {
                continue;
            }
            let cell = self.values.get(index).cloned().unwrap_or_default();
            map.insert(header.clone(), Value::String(cell));
        }
        Value::Object(map)
    }
}

/// Index of `column` in `headers`: exact match after trimming first, then
/// case-insensitive
pub fn column_index(headers: &[String], column: &str) -> Option<usize> {
    let wanted = column.trim();
    headers
        .iter()
        .position(|h| h.trim() == wanted)
        .or_else(|| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        })
}

/// Index of the identifier column, honouring the historical aliases
pub fn id_column_index(headers: &[String]) -> Option<usize> {
    ID_COLUMN_ALIASES
        .iter()
        .find_map(|alias| headers.iter().position(|h| h.trim() == *alias))
}

/// A full read of one sheet: header row plus every data row, in sheet order
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub sheet_name: String,
    pub headers: Arc<Vec<String>>,
    pub rows: Vec<SheetRecord>,
}

impl SheetTable {
    /// Build from raw grid values where the first row is the header
    pub fn from_grid(sheet_name: &str, mut grid: Vec<Vec<String>>) -> Self {
        if grid.is_empty() {
            return Self {
                sheet_name: sheet_name.to_string(),
                headers: Arc::new(Vec::new()),
                rows: Vec::new(),
            };
        }
        let data = grid.split_off(1);
        let headers = Arc::new(grid.remove(0));
        let rows = data
            .into_iter()
            .enumerate()
            .map(|(i, values)| SheetRecord::new(i as u32 + 2, headers.clone(), values))
            .collect();
        Self {
            sheet_name: sheet_name.to_string(),
            headers,
            rows,
        }
    }

    pub fn id_column(&self) -> Option<usize> {
        id_column_index(&self.headers)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        column_index(&self.headers, column)
    }

    /// All rows carrying `id`. More than one means the sheet violates the
    /// one-row-per-ID expectation.
    pub fn find_by_id(&self, id: &str) -> Vec<&SheetRecord> {
        let id = id.trim();
        self.rows
            .iter()
            .filter(|r| r.identifier() == Some(id))
            .collect()
    }

    /// Distinct identifiers present in the sheet. Duplicate rows count once,
    /// matching the single record an import keeps for them.
    pub fn identified_count(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|r| r.identifier())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Next free identifier of the form `<prefix>-<n>`, after the highest
    /// numeric suffix already present for that prefix
    pub fn next_identifier(&self, prefix: &str) -> String {
        let max = self
            .rows
            .iter()
            .filter_map(|r| r.identifier())
            .filter_map(|id| identifier_number(prefix, id))
            .max()
            .unwrap_or(0);
        format_identifier(prefix, max + 1)
    }

    /// Record a row written during the current batch so later lookups and
    /// identifier allocation see it
    pub fn push_row(&mut self, row_number: u32, values: Vec<String>) {
        self.rows
            .push(SheetRecord::new(row_number, self.headers.clone(), values));
    }

    /// Replace cells of a row we just updated. `None` leaves a cell as is.
    pub fn patch_row(&mut self, row_number: u32, cells: &[Option<String>]) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.row_number == row_number) {
            for (index, cell) in cells.iter().enumerate() {
                if let Some(value) = cell {
                    if row.values.len() <= index {
                        row.values.resize(index + 1, String::new());
                    }
                    row.values[index] = value.clone();
                }
            }
        }
    }
}

/// `<prefix>-<n>` with the number zero-padded to four digits
pub fn format_identifier(prefix: &str, number: u64) -> String {
    format!("{}-{:04}", prefix, number)
}

/// Numeric suffix of an identifier allocated under `prefix`
pub fn identifier_number(prefix: &str, id: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.strip_prefix('-')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_grid_numbers_rows_from_two() {
        let table = SheetTable::from_grid(
            "Loans",
            grid(&[&["ID", "Borrower ID"], &["LN-0001", "B-1"], &["LN-0002", "B-2"]]),
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].row_number, 2);
        assert_eq!(table.rows[1].row_number, 3);
        assert_eq!(table.rows[1].get("Borrower ID"), Some("B-2"));
    }

    #[test]
    fn test_trailing_cells_are_undefined() {
        let table = SheetTable::from_grid(
            "Loans",
            grid(&[&["ID", "Status", "Notes"], &["LN-0001", ""]]),
        );
        let row = &table.rows[0];
        assert_eq!(row.get("Status"), Some(""));
        assert_eq!(row.get("Notes"), None);
        assert_eq!(row.get("Missing column"), None);
    }

    #[test]
    fn test_identifier_aliases() {
        let table = SheetTable::from_grid(
            "Payroll",
            grid(&[&["Sheet ID", "Staff ID"], &["PR-0009", "S-1"], &["  ", "S-2"]]),
        );
        assert_eq!(table.rows[0].identifier(), Some("PR-0009"));
        assert_eq!(table.rows[1].identifier(), None);
        assert_eq!(table.id_column(), Some(0));
        assert_eq!(table.identified_count(), 1);
    }

    #[test]
    fn test_empty_marker_is_not_an_identifier() {
        let table = SheetTable::from_grid("Loans", grid(&[&["ID", "Status"], &["(empty)", "Active"]]));
        assert_eq!(table.rows[0].identifier(), None);
        assert!(!table.rows[0].is_empty());
    }

    #[test]
    fn test_column_lookup_tolerates_case_and_padding() {
        let headers = vec![" Monthly Revenue ".to_string(), "ID".to_string()];
        assert_eq!(column_index(&headers, "Monthly Revenue"), Some(0));
        assert_eq!(column_index(&headers, "monthly revenue"), Some(0));
        assert_eq!(column_index(&headers, "Revenue"), None);
    }

    #[test]
    fn test_duplicate_ids_are_all_returned() {
        let table = SheetTable::from_grid(
            "Loans",
            grid(&[&["ID"], &["LN-0001"], &["LN-0002"], &["LN-0001"]]),
        );
        let hits = table.find_by_id("LN-0001");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].row_number, 4);
    }

    #[test]
    fn test_next_identifier() {
        let mut table = SheetTable::from_grid(
            "Loans",
            grid(&[&["ID"], &["LN-0007"], &["LN-0012"], &["legacy-99"], &["LN-abc"]]),
        );
        assert_eq!(table.next_identifier("LN"), "LN-0013");
        assert_eq!(table.next_identifier("WO"), "WO-0001");

        table.push_row(6, vec!["LN-0013".to_string()]);
        assert_eq!(table.next_identifier("LN"), "LN-0014");
    }

    #[test]
    fn test_identified_count_collapses_duplicates() {
        let table = SheetTable::from_grid(
            "Loans",
            grid(&[&["ID"], &["LN-0001"], &["LN-0002"], &[" LN-0001 "], &[""]]),
        );
        assert_eq!(table.identified_count(), 2);
    }

    #[test]
    fn test_identifier_number() {
        assert_eq!(identifier_number("LN", "LN-0042"), Some(42));
        assert_eq!(identifier_number("LN", "LNX-0042"), None);
        assert_eq!(identifier_number("LN", "LN-abc"), None);
        assert_eq!(format_identifier("WO", 7), "WO-0007");
        assert_eq!(format_identifier("WO", 12345), "WO-12345");
    }

    #[test]
    fn test_patch_row_keeps_untouched_cells() {
        let mut table = SheetTable::from_grid(
            "Loans",
            grid(&[&["ID", "Status", "Balance"], &["LN-0001", "Active", "100"]]),
        );
        table.patch_row(2, &[None, Some("Closed".to_string()), None]);
        assert_eq!(table.rows[0].get("Status"), Some("Closed"));
        assert_eq!(table.rows[0].get("Balance"), Some("100"));
    }
}
