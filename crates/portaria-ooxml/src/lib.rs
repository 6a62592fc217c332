//! # portaria-ooxml
//!
//! DOCX (Office Open XML) generation for portaria documents.
//!
//! This crate provides functionality to:
//! - Serialize a `portaria_ast::Document` into a self-contained DOCX
//! - Render into an existing DOCX/DOTX base template, keeping its styles,
//!   headers and footers
//! - Read and rewrite OOXML archives deterministically
//!
//! ## Example
//!
//! ```no_run
//! use portaria_ast::{Block, Document, Paragraph, ParagraphRole};
//! use portaria_ooxml::DocxWriter;
//!
//! let mut doc = Document::with_title("Portaria");
//! doc.push(Block::Paragraph(Paragraph::with_text(ParagraphRole::Title, "PORTARIA")));
//! let bytes = DocxWriter::generate(&doc)?;
//! std::fs::write("Portaria_CCM.docx", bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod error;
pub mod package;
pub mod styles;
pub mod writer;

#[cfg(test)]
mod test_utils;

pub use archive::{OoxmlArchive, CORE_PART, DOCUMENT_PART, STYLES_PART};
pub use error::{OoxmlError, Result};
pub use package::{DOCUMENT_CONTENT_TYPE, TEMPLATE_CONTENT_TYPE};
pub use styles::{Style, StyleSheet, StyleType};
pub use writer::{half_points, mm_to_twips, pt_to_twips, DocxWriter};

/// MIME type of a generated `.docx`
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
