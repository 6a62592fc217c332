//! Block-level elements for document structure
//!
//! A generated portaria only needs three kinds of blocks: styled paragraphs
//! (preamble text and annex labels), tables (one per annex) and breaks.

use serde::{Deserialize, Serialize};

use crate::document::PageSetup;
use crate::inline::Inline;

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// A table
    Table(Table),
    /// A page or section break
    Break(BreakType),
}

/// Semantic role of a paragraph inside the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphRole {
    /// Title block of the preamble
    Title,
    /// Justified body/authority text
    #[default]
    Body,
    /// Closing and signature block
    Signature,
    /// Label preceding an annex table
    AnnexLabel,
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content within the paragraph
    pub inlines: Vec<Inline>,
    /// Semantic role
    pub role: ParagraphRole,
    /// Direct formatting
    pub format: ParagraphFormat,
    /// Style ID to reference in the output (e.g., a template paragraph style)
    pub style_id: Option<String>,
}

impl Paragraph {
    /// Create a paragraph with a role and a single text run
    pub fn with_text(role: ParagraphRole, text: impl Into<String>) -> Self {
        Self {
            inlines: vec![Inline::Text(text.into())],
            role,
            ..Default::default()
        }
    }

    /// Plain text of the paragraph
    pub fn plain_text(&self) -> String {
        self.inlines.iter().map(Inline::plain_text).collect()
    }
}

/// Direct paragraph formatting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParagraphFormat {
    /// Horizontal alignment
    pub align: Option<Alignment>,
    /// Render every run in bold
    pub bold: bool,
    /// Font size in points
    pub font_size_pt: Option<f32>,
    /// Spacing after the paragraph in points
    pub space_after_pt: Option<f32>,
    /// First line indent in millimetres
    pub first_line_indent_mm: Option<f32>,
}

/// A table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table rows
    pub rows: Vec<TableRow>,
    /// Style ID to reference in the output
    pub style_id: Option<String>,
    /// Column specifications
    pub columns: Vec<ColumnSpec>,
    /// Font size in points applied to every cell
    pub font_size_pt: Option<f32>,
    /// Background colour of header cells (hex RGB, e.g. `D9D9D9`)
    pub header_fill: Option<String>,
}

impl Table {
    /// Number of grid columns
    pub fn column_count(&self) -> usize {
        if self.columns.is_empty() {
            self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
        } else {
            self.columns.len()
        }
    }

    /// Index of the first row whose cell count differs from the grid
    pub fn first_ragged_row(&self) -> Option<usize> {
        let width = self.column_count();
        self.rows.iter().position(|row| row.cells.len() != width)
    }
}

/// A table row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
    /// Whether this is a header row (repeated on every page)
    pub is_header: bool,
}

impl TableRow {
    /// Build a row of plain text cells
    pub fn from_texts<I, S>(values: I, is_header: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: values.into_iter().map(TableCell::text).collect(),
            is_header,
        }
    }
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content
    pub content: Vec<Inline>,
    /// Horizontal alignment
    pub align: Option<Alignment>,
}

impl TableCell {
    /// A cell holding one text run; empty text yields an empty cell
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        let content = if value.is_empty() {
            Vec::new()
        } else {
            vec![Inline::Text(value)]
        };
        Self {
            content,
            align: None,
        }
    }

    /// Plain text of the cell
    pub fn plain_text(&self) -> String {
        self.content.iter().map(Inline::plain_text).collect()
    }
}

/// Column specification
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Relative width (e.g., 1, 2, 3 for proportional sizing)
    pub width: Option<u32>,
    /// Default alignment for this column
    pub align: Option<Alignment>,
}

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Break type variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BreakType {
    /// Page break
    Page,
    /// Section break; the page setup describes the section being closed
    Section(PageSetup),
}
