//! # portaria-data
//!
//! Row sources for portaria: read a spreadsheet tab as plain rows of string
//! cells. The header row sits at a fixed offset (row 4 by default) and rows
//! may be short or empty.
//!
//! ## Sources
//!
//! - **Google Sheets**: `values.get` over `reqwest` (blocking)
//! - **CSV**: local exports via `csv`
//! - **Excel**: local `.xlsx` workbooks via `calamine`
//! - **Memory**: fixed rows for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use portaria_data::{GoogleSheetsProvider, SheetsConfig, SourceProvider};
//!
//! let provider = GoogleSheetsProvider::new(SheetsConfig::default())?;
//! let id = provider.sheet_id("https://docs.google.com/spreadsheets/d/<id>/edit").unwrap();
//! let source = provider.open(&id, "Escolas")?;
//! let header = source.fetch_header()?;
//! let rows = source.fetch_all()?;
//! ```

pub mod error;
pub mod range;
pub mod sheet_id;
pub mod sources;

// Re-exports
pub use error::{DataError, Result};
pub use range::{column_to_index, index_to_column, SheetLayout};
pub use sheet_id::SheetId;
pub use sources::{
    header_from_rows, is_blank_row, CsvOptions, CsvProvider, CsvSource, ExcelProvider,
    ExcelSource, GoogleSheetsProvider, GoogleSheetsSource, MemoryProvider, MemorySource,
    RowSource, SheetsAuth, SheetsConfig, SourceProvider, DEFAULT_SHEETS_URL,
};
