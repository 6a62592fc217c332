//! Request types and boundary parsing
//!
//! Callers hand over raw strings (a link, a tab name, a column letter and two
//! comma-separated lists). They are validated here once and turned into typed
//! values, so the engine never deals with raw input.

use std::collections::BTreeSet;

use portaria_data::column_to_index;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// A request to generate a portaria document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Spreadsheet link or identifier (a file path for local sources)
    pub link: String,
    /// Tab (worksheet) name
    pub tab: String,
    /// Column letter whose values partition rows into annexes
    pub group_column: String,
    /// Comma-separated exclusion terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_terms: Option<String>,
    /// Comma-separated zero-based column indices to drop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_columns: Option<String>,
}

/// A request to list the columns of the header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRequest {
    pub link: String,
    pub tab: String,
}

/// A generation request after boundary validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub link: String,
    pub tab: String,
    pub group: GroupColumn,
    pub filter: FilterConfig,
    pub removed: RemovedColumns,
}

impl GenerationRequest {
    /// Validate required fields and parse the list arguments
    pub fn parse(&self) -> Result<ParsedRequest> {
        let link = required(&self.link, "spreadsheet link")?;
        let tab = required(&self.tab, "tab name")?;
        let letter = required(&self.group_column, "group column letter")?;

        Ok(ParsedRequest {
            link,
            tab,
            group: GroupColumn::parse(&letter)?,
            filter: FilterConfig::parse(self.exclusion_terms.as_deref()),
            removed: RemovedColumns::parse(self.removed_columns.as_deref())?,
        })
    }
}

impl HeaderRequest {
    /// Validate required fields, returning the trimmed link and tab
    pub fn parse(&self) -> Result<(String, String)> {
        Ok((
            required(&self.link, "spreadsheet link")?,
            required(&self.tab, "tab name")?,
        ))
    }
}

fn required(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(PipelineError::InputValidation(format!("Missing {}", what)))
    } else {
        Ok(value.to_string())
    }
}

/// Upper-cased exclusion terms, in first-seen order without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    terms: Vec<String>,
}

impl FilterConfig {
    /// Parse a comma-separated list; blank entries are ignored
    pub fn parse(raw: Option<&str>) -> Self {
        let mut terms: Vec<String> = Vec::new();
        for term in raw.unwrap_or_default().split(',') {
            let term = term.trim().to_uppercase();
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        }
        Self { terms }
    }

    /// The normalized terms
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether any term occurs in the upper-cased, space-joined row
    pub fn excludes(&self, row: &[String]) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        let haystack = row.join(" ").to_uppercase();
        self.terms.iter().any(|term| haystack.contains(term.as_str()))
    }
}

/// Zero-based column indices removed from the output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedColumns(BTreeSet<usize>);

impl RemovedColumns {
    /// Parse a comma-separated list of indices; blank entries are ignored
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let mut indices = BTreeSet::new();
        for entry in raw.unwrap_or_default().split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let index = entry.parse::<usize>().map_err(|_| {
                PipelineError::InputValidation(format!("Invalid column index: '{}'", entry))
            })?;
            indices.insert(index);
        }
        Ok(Self(indices))
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<usize> for RemovedColumns {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The validated grouping column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupColumn(usize);

impl GroupColumn {
    /// Parse a column letter (`A` is 0); multi-letter references such as
    /// `AH` are accepted
    pub fn parse(letter: &str) -> Result<Self> {
        let letter = letter.trim();
        if letter.is_empty() || !letter.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PipelineError::InputValidation(format!(
                "Invalid group column letter: '{}'",
                letter
            )));
        }
        let index = column_to_index(letter).map_err(|_| {
            PipelineError::InputValidation(format!("Invalid group column letter: '{}'", letter))
        })?;
        Ok(Self(index as usize))
    }

    /// Build from a zero-based index
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Zero-based column index
    pub fn index(&self) -> usize {
        self.0
    }
}
