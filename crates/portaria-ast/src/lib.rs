//! portaria-ast - Document model
//!
//! This crate provides the format-agnostic document types produced by the
//! composer and consumed by the DOCX writer.

pub mod block;
pub mod document;
pub mod inline;

pub use block::{
    Alignment, Block, BreakType, ColumnSpec, Paragraph, ParagraphFormat, ParagraphRole, Table,
    TableCell, TableRow,
};
pub use document::{Document, DocumentMeta, FontSpec, Orientation, PageSetup};
pub use inline::{FormatType, Inline};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
