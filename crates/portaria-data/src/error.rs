//! Error types for row sources.

use thiserror::Error;

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading rows from a source
#[derive(Debug, Error)]
pub enum DataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Failed to open workbook
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    /// Sheet (tab) not found
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid range or column reference
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// The header row is absent or blank
    #[error("Header row {row} is empty or missing")]
    EmptyHeader { row: u32 },

    /// The remote endpoint URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote provider answered with an error status
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Malformed payload from the remote provider
    #[error("Unexpected response payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// CSV parse error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Calamine error
    #[error("Excel error: {0}")]
    Calamine(String),
}

impl DataError {
    /// Whether the failure means the data itself was unusable, as opposed to
    /// the source being unreachable
    pub fn is_shape_error(&self) -> bool {
        matches!(self, DataError::EmptyHeader { .. })
    }
}

impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::Calamine(err.to_string())
    }
}

impl From<calamine::XlsxError> for DataError {
    fn from(err: calamine::XlsxError) -> Self {
        DataError::Calamine(err.to_string())
    }
}
