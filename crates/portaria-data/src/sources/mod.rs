//! Row source implementations.
//!
//! A [`SourceProvider`] is built once per process and hands out one
//! [`RowSource`] per request; sources never cache between requests.

pub mod csv;
pub mod excel;
pub mod google;
pub mod memory;

pub use self::csv::{CsvOptions, CsvProvider, CsvSource};
pub use excel::{ExcelProvider, ExcelSource};
pub use google::{
    GoogleSheetsProvider, GoogleSheetsSource, SheetsAuth, SheetsConfig, DEFAULT_SHEETS_URL,
};
pub use memory::{MemoryProvider, MemorySource};

use crate::error::{DataError, Result};
use crate::range::SheetLayout;
use crate::sheet_id::SheetId;

/// A readable sheet region
pub trait RowSource {
    /// Layout used to locate the header row
    fn layout(&self) -> &SheetLayout;

    /// All rows across the full column range, including the header row and
    /// every row above it
    fn fetch_all(&self) -> Result<Vec<Vec<String>>>;

    /// The single row at the header offset
    ///
    /// Fails with [`DataError::EmptyHeader`] if the row is absent or blank.
    fn fetch_header(&self) -> Result<Vec<String>> {
        let rows = self.fetch_all()?;
        header_from_rows(&rows, self.layout())
    }
}

/// Factory for per-request row sources
pub trait SourceProvider: Send + Sync {
    /// Turn user input into a sheet identifier
    fn sheet_id(&self, link: &str) -> Option<SheetId> {
        SheetId::from_link(link)
    }

    /// Open a source for one tab of one spreadsheet
    fn open(&self, sheet: &SheetId, tab: &str) -> Result<Box<dyn RowSource>>;
}

/// Pick the header row out of a full read
pub fn header_from_rows(rows: &[Vec<String>], layout: &SheetLayout) -> Result<Vec<String>> {
    match rows.get(layout.header_offset()) {
        Some(row) if !is_blank_row(row) => Ok(row.clone()),
        _ => Err(DataError::EmptyHeader {
            row: layout.header_row,
        }),
    }
}

/// True when the row has no cells or only whitespace cells
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Drop trailing empty cells so local sources look like the Sheets API,
/// which omits them
pub(crate) fn trim_trailing_empty(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|cell| cell.is_empty()) {
        row.pop();
    }
    row
}

/// Drop trailing rows that have no cells at all
pub(crate) fn trim_trailing_rows(mut rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_from_rows() {
        let rows = vec![
            row(&["PORTARIA"]),
            row(&[]),
            row(&[]),
            row(&["Nome", "", "Escola"]),
            row(&["Ana", "", "A"]),
        ];
        let header = header_from_rows(&rows, &SheetLayout::default()).unwrap();
        assert_eq!(header, row(&["Nome", "", "Escola"]));
    }

    #[test]
    fn test_header_missing() {
        let rows = vec![row(&["a"]), row(&["b"])];
        let err = header_from_rows(&rows, &SheetLayout::default()).unwrap_err();
        assert!(matches!(err, DataError::EmptyHeader { row: 4 }));
    }

    #[test]
    fn test_header_blank() {
        let rows = vec![row(&[]), row(&[]), row(&[]), row(&["  ", ""])];
        assert!(header_from_rows(&rows, &SheetLayout::default()).is_err());
    }

    #[test]
    fn test_trim_trailing_empty() {
        assert_eq!(trim_trailing_empty(row(&["a", "", "b", "", ""])), row(&["a", "", "b"]));
        assert!(trim_trailing_empty(row(&["", ""])).is_empty());
    }

    #[test]
    fn test_trim_trailing_rows() {
        let rows = vec![row(&["a"]), row(&[]), row(&["b"]), row(&[]), row(&[])];
        assert_eq!(trim_trailing_rows(rows).len(), 3);
    }
}
