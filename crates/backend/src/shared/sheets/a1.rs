//! A1 notation helpers

/// Column letter for a 0-based column index: 0 -> A, 25 -> Z, 26 -> AA
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Sheet name quoted for use in a range, `'` doubled
pub fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// Whole sheet
pub fn sheet_range(sheet: &str) -> String {
    quote_sheet(sheet)
}

/// Header row
pub fn header_range(sheet: &str) -> String {
    format!("{}!1:1", quote_sheet(sheet))
}

/// One column from row 2 to the end
pub fn column_range(sheet: &str, index: usize) -> String {
    let letter = column_letter(index);
    format!("{}!{}2:{}", quote_sheet(sheet), letter, letter)
}

/// Cells A..<width> of one row
pub fn row_range(sheet: &str, row: u32, width: usize) -> String {
    format!(
        "{}!A{}:{}{}",
        quote_sheet(sheet),
        row,
        column_letter(width.max(1) - 1),
        row
    )
}

/// Row number of the first row in a range such as `'Loans'!A12:K12`
pub fn first_row_of_range(range: &str) -> Option<u32> {
    let cells = range.rsplit('!').next()?;
    let start = cells.split(':').next()?;
    let digits: String = start.chars().skip_while(|c| c.is_ascii_alphabetic()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(header_range("Loans"), "'Loans'!1:1");
        assert_eq!(column_range("Write-offs", 0), "'Write-offs'!A2:A");
        assert_eq!(row_range("Payroll", 7, 11), "'Payroll'!A7:K7");
        assert_eq!(sheet_range("Owner's sheet"), "'Owner''s sheet'");
    }

    #[test]
    fn test_first_row_of_range() {
        assert_eq!(first_row_of_range("'Loans'!A12:K12"), Some(12));
        assert_eq!(first_row_of_range("Payroll!B3"), Some(3));
        assert_eq!(first_row_of_range("'Loans'!A:K"), None);
    }
}
