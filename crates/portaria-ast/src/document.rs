//! Document root and metadata definitions

use serde::{Deserialize, Serialize};

use crate::block::Block;

/// A complete document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Document metadata (title, page setup of the last section)
    pub metadata: DocumentMeta,
    /// Document content blocks
    pub blocks: Vec<Block>,
}

/// Document metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentMeta {
    /// Document title (written to the core properties)
    pub title: Option<String>,
    /// Default font for every run
    pub font: FontSpec,
    /// Page setup of the final section
    pub page: PageSetup,
}

/// Default font applied to the whole document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// Font family name
    pub family: String,
    /// Size in points
    pub size_pt: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size_pt: 12.0,
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page size and margins of a section (A4 by default)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub orientation: Orientation,
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_top_mm: f32,
    pub margin_bottom_mm: f32,
    pub margin_left_mm: f32,
    pub margin_right_mm: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            width_mm: 210.0,
            height_mm: 297.0,
            margin_top_mm: 25.0,
            margin_bottom_mm: 20.0,
            margin_left_mm: 30.0,
            margin_right_mm: 20.0,
        }
    }
}

impl PageSetup {
    /// Width and height as laid out on the page, honouring orientation
    pub fn oriented_size_mm(&self) -> (f32, f32) {
        let (short, long) = if self.width_mm <= self.height_mm {
            (self.width_mm, self.height_mm)
        } else {
            (self.height_mm, self.width_mm)
        };
        match self.orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }

    /// Usable text width between the side margins
    pub fn text_width_mm(&self) -> f32 {
        let (width, _) = self.oriented_size_mm();
        (width - self.margin_left_mm - self.margin_right_mm).max(0.0)
    }
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with a title
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            metadata: DocumentMeta {
                title: Some(title.into()),
                ..Default::default()
            },
            blocks: Vec::new(),
        }
    }

    /// Add a block to the document
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if the document is empty (no blocks)
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Iterate over the tables of the document
    pub fn tables(&self) -> impl Iterator<Item = &crate::block::Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}
