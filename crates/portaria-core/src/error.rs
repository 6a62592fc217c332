//! Pipeline error taxonomy
//!
//! Every failure a request can hit maps to one [`PipelineError`] variant, and
//! every variant carries an HTTP-like status so callers can answer with a
//! structured [`ErrorPayload`] instead of panicking.

use portaria_data::DataError;
use portaria_ooxml::OoxmlError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while turning a request into a document
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or malformed request field
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// The spreadsheet could not be read
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(#[source] DataError),

    /// The sheet was read but does not have the expected shape
    #[error(transparent)]
    ShapeViolation(#[from] ShapeViolation),

    /// Every data row was dropped
    #[error("No data left after filtering (exclusion terms: {})", describe_terms(.terms))]
    FilterExhausted { terms: Vec<String> },

    /// The document could not be assembled or serialized
    #[error("Document composition failed: {0}")]
    CompositionFailure(String),
}

/// Ways a sheet can be structurally unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    #[error("Header row {row} is empty or missing")]
    EmptyHeader { row: u32 },

    #[error("Sheet has {rows} row(s) but the header is expected at row {header_row}")]
    SheetTooShort { rows: usize, header_row: u32 },
}

fn describe_terms(terms: &[String]) -> String {
    if terms.is_empty() {
        "none".to_string()
    } else {
        terms.join(", ")
    }
}

impl PipelineError {
    /// HTTP-like status for this error class
    pub fn status(&self) -> u16 {
        match self {
            PipelineError::InputValidation(_) => 400,
            PipelineError::SourceUnavailable(_) => 502,
            PipelineError::ShapeViolation(_) | PipelineError::FilterExhausted { .. } => 422,
            PipelineError::CompositionFailure(_) => 500,
        }
    }

    /// Short machine-readable name of the error class
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InputValidation(_) => "input_validation",
            PipelineError::SourceUnavailable(_) => "source_unavailable",
            PipelineError::ShapeViolation(_) => "shape_violation",
            PipelineError::FilterExhausted { .. } => "filter_exhausted",
            PipelineError::CompositionFailure(_) => "composition_failure",
        }
    }

    /// Structured payload for callers
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            status: self.status(),
        }
    }
}

impl From<DataError> for PipelineError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::EmptyHeader { row } => ShapeViolation::EmptyHeader { row }.into(),
            DataError::InvalidRange(msg) => PipelineError::InputValidation(msg),
            other => PipelineError::SourceUnavailable(other),
        }
    }
}

impl From<OoxmlError> for PipelineError {
    fn from(err: OoxmlError) -> Self {
        PipelineError::CompositionFailure(err.to_string())
    }
}

/// Error body returned to callers: `{ "error": "...", "status": 422 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub status: u16,
}

impl From<PipelineError> for ErrorPayload {
    fn from(err: PipelineError) -> Self {
        err.to_payload()
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (status {})", self.error, self.status)
    }
}

impl std::error::Error for ErrorPayload {}
