//! CSV data source.
//!
//! Lets the pipeline run against an exported sheet without network access.
//! The file path plays the role of the spreadsheet identifier; the tab name
//! is ignored since CSV files have a single sheet.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DataError, Result};
use crate::range::SheetLayout;
use crate::sheet_id::SheetId;
use crate::sources::{trim_trailing_empty, trim_trailing_rows, RowSource, SourceProvider};

/// Options for CSV parsing
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether to trim whitespace from fields
    pub trim: bool,
    /// Whether to allow rows of different lengths
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
            flexible: true,
        }
    }
}

impl CsvOptions {
    /// Create options for tab-separated values (TSV)
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Create options for semicolon-separated values (common in pt-BR exports)
    pub fn semicolon() -> Self {
        Self {
            delimiter: b';',
            ..Default::default()
        }
    }

    /// Guess the options from the file extension
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Self::tsv(),
            _ => Self::default(),
        }
    }
}

/// CSV file data source
pub struct CsvSource {
    /// Path to the CSV file
    path: PathBuf,
    /// Parsing options
    options: CsvOptions,
    /// Header location
    layout: SheetLayout,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default(), SheetLayout::default())
    }

    /// Create a new CSV source with custom options
    pub fn with_options(
        path: impl AsRef<Path>,
        options: CsvOptions,
        layout: SheetLayout,
    ) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            options,
            layout,
        })
    }

    /// Read all records from the CSV file
    ///
    /// Blank lines come back as empty rows so the header stays at its
    /// configured line. Rows are capped at the layout width and lose
    /// trailing empty cells, like the other sources.
    pub fn read_all(&self) -> Result<Vec<Vec<String>>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let max_cols = self.layout.column_count()?;

        // Trimming is applied below so embedded newlines can still be counted
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(false) // The header row is located by the layout
            .trim(csv::Trim::None)
            .flexible(self.options.flexible)
            .from_reader(reader);

        let mut result = Vec::new();
        let mut record = csv::StringRecord::new();
        let mut next_line: u64 = 1;
        while csv_reader.read_record(&mut record)? {
            let line = record.position().map_or(next_line, |p| p.line());
            // The reader skips empty lines entirely
            while next_line < line {
                result.push(Vec::new());
                next_line += 1;
            }
            let embedded: usize = record.iter().map(|field| field.matches('\n').count()).sum();
            next_line = line + 1 + embedded as u64;

            let row: Vec<String> = record
                .iter()
                .take(max_cols)
                .map(|field| {
                    if self.options.trim {
                        field.trim().to_string()
                    } else {
                        field.to_string()
                    }
                })
                .collect();
            result.push(trim_trailing_empty(row));
        }

        debug!(path = %self.path.display(), rows = result.len(), "read csv");
        Ok(trim_trailing_rows(result))
    }
}

impl RowSource for CsvSource {
    fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
        self.read_all()
    }
}

/// Opens CSV files named by the request link
#[derive(Debug, Clone, Default)]
pub struct CsvProvider {
    layout: SheetLayout,
}

impl CsvProvider {
    /// Create a provider using the given layout
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }
}

impl SourceProvider for CsvProvider {
    fn sheet_id(&self, link: &str) -> Option<SheetId> {
        SheetId::literal(link)
    }

    fn open(&self, sheet: &SheetId, _tab: &str) -> Result<Box<dyn RowSource>> {
        let path = Path::new(sheet.as_str());
        let source = CsvSource::with_options(path, CsvOptions::for_path(path), self.layout.clone())?;
        Ok(Box::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_csv_read_all_flexible() {
        let file = create_test_csv("PORTARIA,,,\n,,,\n,,,\nNome,,Escola,Status\nAna,,A,FALSE\nBia\n");

        let source = CsvSource::new(file.path()).unwrap();
        let data = source.read_all().unwrap();

        assert_eq!(data.len(), 6);
        assert_eq!(data[0], vec!["PORTARIA"]);
        assert!(data[1].is_empty());
        assert_eq!(data[3], vec!["Nome", "", "Escola", "Status"]);
        assert_eq!(data.last().unwrap(), &vec!["Bia".to_string()]);
    }

    #[test]
    fn test_csv_fetch_header_uses_layout() {
        let file = create_test_csv("t\nx\ny\nNome,Escola\nAna,A\n");

        let source = CsvSource::new(file.path()).unwrap();
        assert_eq!(source.fetch_header().unwrap(), vec!["Nome", "Escola"]);
    }

    #[test]
    fn test_csv_blank_lines_keep_row_positions() {
        let file = create_test_csv("PORTARIA\n\n\nNome,Escola\nAna,A\n");

        let source = CsvSource::new(file.path()).unwrap();
        let data = source.read_all().unwrap();
        assert_eq!(data.len(), 5);
        assert!(data[1].is_empty());
        assert!(data[2].is_empty());
        assert_eq!(source.fetch_header().unwrap(), vec!["Nome", "Escola"]);
    }

    #[test]
    fn test_csv_multiline_field_does_not_shift_rows() {
        let file = create_test_csv("\"linha\num\"\n\nx\nNome\nAna\n");

        let source = CsvSource::new(file.path()).unwrap();
        assert_eq!(source.fetch_header().unwrap(), vec!["Nome"]);
    }

    #[test]
    fn test_csv_trailing_empty_cells_dropped() {
        let file = create_test_csv("a,,\nb,,\nc,,\nNome,Escola,\nAna,,\n");

        let source = CsvSource::new(file.path()).unwrap();
        assert_eq!(source.fetch_header().unwrap(), vec!["Nome", "Escola"]);
        assert_eq!(source.read_all().unwrap()[4], vec!["Ana"]);
    }

    #[test]
    fn test_csv_rows_capped_at_last_column() {
        let file = create_test_csv("Nome,Escola,Extra\nAna,A,x\n");

        let layout = SheetLayout {
            header_row: 1,
            last_column: "B".to_string(),
        };
        let source = CsvSource::with_options(file.path(), CsvOptions::default(), layout).unwrap();
        let data = source.read_all().unwrap();
        assert_eq!(data[0], vec!["Nome", "Escola"]);
        assert_eq!(data[1], vec!["Ana", "A"]);
    }

    #[test]
    fn test_csv_header_row_is_configurable() {
        let file = create_test_csv("Nome,Escola\nAna,A\n");

        let layout = SheetLayout {
            header_row: 1,
            ..Default::default()
        };
        let source = CsvSource::with_options(file.path(), CsvOptions::default(), layout).unwrap();
        assert_eq!(source.fetch_header().unwrap(), vec!["Nome", "Escola"]);
    }

    #[test]
    fn test_csv_short_file_has_no_header() {
        let file = create_test_csv("a\nb\n");

        let source = CsvSource::new(file.path()).unwrap();
        assert!(matches!(
            source.fetch_header(),
            Err(DataError::EmptyHeader { row: 4 })
        ));
    }

    #[test]
    fn test_csv_semicolon() {
        let file = create_test_csv("Nome;Escola\nAna;A\n");

        let source =
            CsvSource::with_options(file.path(), CsvOptions::semicolon(), SheetLayout::default())
                .unwrap();
        let data = source.read_all().unwrap();
        assert_eq!(data[0], vec!["Nome", "Escola"]);
    }

    #[test]
    fn test_csv_quoted_fields() {
        let file = create_test_csv("Nome,Obs\n\"Ana\",\"Valor, com vírgula\"\n");

        let source = CsvSource::new(file.path()).unwrap();
        let data = source.read_all().unwrap();
        assert_eq!(data[1][1], "Valor, com vírgula");
    }

    #[test]
    fn test_csv_file_not_found() {
        let result = CsvSource::new("/nonexistent/path/file.csv");
        assert!(matches!(result, Err(DataError::FileNotFound(_))));
    }

    #[test]
    fn test_provider_uses_literal_path() {
        let file = create_test_csv("a\nb\nc\nNome\nAna\n");
        let provider = CsvProvider::default();

        let link = file.path().display().to_string();
        let id = provider.sheet_id(&link).unwrap();
        assert_eq!(id.as_str(), link);

        let source = provider.open(&id, "ignored").unwrap();
        assert_eq!(source.fetch_all().unwrap().len(), 5);
    }
}
