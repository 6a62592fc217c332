//! Filter & grouping engine
//!
//! Turns the raw data rows of a sheet into ordered groups of projected rows:
//!
//! 1. Retained columns are the header columns that are neither removed nor
//!    blank-named, in sheet order.
//! 2. Each data row is dropped if it is blank, if any exclusion term occurs in
//!    the whole raw row (removed columns included), or if it has fewer than
//!    two cells.
//! 3. Surviving rows are keyed by the trimmed group cell (`GERAL` when blank)
//!    and projected onto the retained columns.

use std::collections::HashMap;

use portaria_data::is_blank_row;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::request::{FilterConfig, GroupColumn, RemovedColumns};

/// Group key used when the group cell is absent or blank
pub const DEFAULT_GROUP: &str = "GERAL";

/// Rows with fewer cells than this are dropped
const MIN_ROW_CELLS: usize = 2;

/// A column kept in the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Zero-based index in the sheet
    pub index: usize,
    /// Trimmed header name
    pub name: String,
}

/// Rows sharing one group key, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: String,
    pub rows: Vec<Vec<String>>,
}

/// Groups in first-seen key order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groups {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a projection, creating the group on first encounter
    pub fn push(&mut self, key: String, projection: Vec<String>) {
        match self.index.get(&key) {
            Some(&i) => self.groups[i].rows.push(projection),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(Group {
                    key,
                    rows: vec![projection],
                });
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Group> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of projected rows across all groups
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }
}

/// Row counters for one engine run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub rows_seen: usize,
    pub blank: usize,
    pub excluded: usize,
    pub short: usize,
    pub kept: usize,
}

/// Result of an engine run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub columns: Vec<ColumnSpec>,
    pub groups: Groups,
    pub stats: EngineStats,
}

/// Filter, group and project data rows
#[derive(Debug, Clone)]
pub struct Engine {
    filter: FilterConfig,
    removed: RemovedColumns,
    group: GroupColumn,
}

impl Engine {
    pub fn new(filter: FilterConfig, removed: RemovedColumns, group: GroupColumn) -> Self {
        Self {
            filter,
            removed,
            group,
        }
    }

    /// Retained columns: not removed and with a non-blank header name
    pub fn column_specs(&self, header: &[String]) -> Vec<ColumnSpec> {
        header
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.removed.contains(*i))
            .filter_map(|(index, name)| {
                let name = name.trim();
                (!name.is_empty()).then(|| ColumnSpec {
                    index,
                    name: name.to_string(),
                })
            })
            .collect()
    }

    /// Run over the data rows (the rows below the header)
    ///
    /// Fails with [`PipelineError::FilterExhausted`] when no row survives.
    pub fn run(&self, header: &[String], rows: &[Vec<String>]) -> Result<EngineOutput> {
        let columns = self.column_specs(header);
        let mut groups = Groups::new();
        let mut stats = EngineStats::default();

        for row in rows {
            stats.rows_seen += 1;

            if is_blank_row(row) {
                stats.blank += 1;
                continue;
            }
            // Exclusion looks at the raw row, before projection
            if self.filter.excludes(row) {
                stats.excluded += 1;
                continue;
            }
            if row.len() < MIN_ROW_CELLS {
                stats.short += 1;
                continue;
            }

            groups.push(self.group_key(row), project(row, &columns));
            stats.kept += 1;
        }

        debug!(
            columns = columns.len(),
            groups = groups.len(),
            rows_seen = stats.rows_seen,
            blank = stats.blank,
            excluded = stats.excluded,
            short = stats.short,
            kept = stats.kept,
            "Engine run complete"
        );

        if groups.is_empty() {
            return Err(PipelineError::FilterExhausted {
                terms: self.filter.terms().to_vec(),
            });
        }

        Ok(EngineOutput {
            columns,
            groups,
            stats,
        })
    }

    fn group_key(&self, row: &[String]) -> String {
        match row.get(self.group.index()).map(|cell| cell.trim()) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => DEFAULT_GROUP.to_string(),
        }
    }
}

/// Reduce a row to the retained columns; missing cells become `""`
pub fn project(row: &[String], columns: &[ColumnSpec]) -> Vec<String> {
    columns
        .iter()
        .map(|col| {
            row.get(col.index)
                .map(|cell| cell.trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}
