//! Excel/XLSX data source using calamine.

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::range::SheetLayout;
use crate::sheet_id::SheetId;
use crate::sources::{trim_trailing_empty, trim_trailing_rows, RowSource, SourceProvider};

/// One worksheet of an Excel workbook
pub struct ExcelSource {
    /// Path to the Excel file
    path: PathBuf,
    /// Worksheet name
    sheet: String,
    /// Header location and column bound
    layout: SheetLayout,
}

impl ExcelSource {
    /// Create a new Excel source for one worksheet
    pub fn new(path: impl AsRef<Path>, sheet: &str, layout: SheetLayout) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            layout,
        })
    }

    /// List worksheet names in the workbook
    pub fn sheet_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
        let workbook: Xlsx<_> = open_workbook(path.as_ref())
            .map_err(|e: XlsxError| DataError::WorkbookOpen(e.to_string()))?;
        Ok(workbook.sheet_names().to_vec())
    }

    /// Convert a calamine cell to a string
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => {
                // Whole numbers print without decimals, as the sheet shows them
                if f.fract() == 0.0 {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Data::Error(e) => format!("#ERROR: {:?}", e),
            Data::DateTime(dt) => format!("{}", dt),
            Data::DateTimeIso(s) => s.clone(),
            Data::DurationIso(s) => s.clone(),
        }
    }

    /// Extract rows from absolute row 0 down to the last used row
    fn extract_rows(sheet_range: &Range<Data>, max_cols: usize) -> Vec<Vec<String>> {
        let Some((end_row, end_col)) = sheet_range.end() else {
            return Vec::new();
        };
        let last_col = (end_col as usize).min(max_cols.saturating_sub(1));

        let mut result = Vec::with_capacity(end_row as usize + 1);
        for row_idx in 0..=end_row {
            let row: Vec<String> = (0..=last_col as u32)
                .map(|col_idx| {
                    sheet_range
                        .get_value((row_idx, col_idx))
                        .map(Self::cell_to_string)
                        .unwrap_or_default()
                })
                .collect();
            result.push(trim_trailing_empty(row));
        }
        trim_trailing_rows(result)
    }
}

impl RowSource for ExcelSource {
    fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e: XlsxError| DataError::WorkbookOpen(format!("{}: {}", self.path.display(), e)))?;

        let sheet_range = workbook
            .worksheet_range(&self.sheet)
            .map_err(|e| DataError::SheetNotFound(format!("{}: {}", self.sheet, e)))?;

        let rows = Self::extract_rows(&sheet_range, self.layout.column_count()?);
        debug!(path = %self.path.display(), sheet = %self.sheet, rows = rows.len(), "read worksheet");
        Ok(rows)
    }
}

/// Opens worksheets of local workbooks; the tab names the worksheet
#[derive(Debug, Clone, Default)]
pub struct ExcelProvider {
    layout: SheetLayout,
}

impl ExcelProvider {
    /// Create a provider using the given layout
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }
}

impl SourceProvider for ExcelProvider {
    fn sheet_id(&self, link: &str) -> Option<SheetId> {
        SheetId::literal(link)
    }

    fn open(&self, sheet: &SheetId, tab: &str) -> Result<Box<dyn RowSource>> {
        let source = ExcelSource::new(sheet.as_str(), tab, self.layout.clone())?;
        Ok(Box::new(source))
    }
}
