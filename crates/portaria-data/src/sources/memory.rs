//! In-memory rows, used as a substitutable fake for remote providers.

use std::collections::HashMap;

use crate::error::{DataError, Result};
use crate::range::SheetLayout;
use crate::sheet_id::SheetId;
use crate::sources::{RowSource, SourceProvider};

/// A fixed table of rows
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Vec<String>>,
    layout: SheetLayout,
}

impl MemorySource {
    /// Wrap rows with the default layout
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            layout: SheetLayout::default(),
        }
    }

    /// Override the layout
    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl RowSource for MemorySource {
    fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }
}

/// Serves registered tables keyed by `(sheet id, tab)`
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    tables: HashMap<(String, String), Vec<Vec<String>>>,
    layout: SheetLayout,
}

impl MemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the layout handed to every source
    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Register a table
    pub fn with_table<R, C, S>(mut self, sheet: &str, tab: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.tables
            .insert((sheet.to_string(), tab.to_string()), rows);
        self
    }
}

impl SourceProvider for MemoryProvider {
    fn open(&self, sheet: &SheetId, tab: &str) -> Result<Box<dyn RowSource>> {
        let rows = self
            .tables
            .get(&(sheet.as_str().to_string(), tab.to_string()))
            .cloned()
            .ok_or_else(|| DataError::SheetNotFound(format!("{}/{}", sheet, tab)))?;
        Ok(Box::new(
            MemorySource::new(rows).with_layout(self.layout.clone()),
        ))
    }
}
