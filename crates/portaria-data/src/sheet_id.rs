//! Spreadsheet identifiers extracted from user-supplied links.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Opaque spreadsheet identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetId(String);

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)|/d/([A-Za-z0-9_-]+)")
            .expect("sheet link pattern is valid")
    })
}

impl SheetId {
    /// Extract the identifier from a share link such as
    /// `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0`.
    ///
    /// Falls back to the whole trimmed input when no `/d/<id>` segment exists,
    /// so a bare identifier can be pasted directly. Returns `None` for blank
    /// input.
    pub fn from_link(link: &str) -> Option<Self> {
        let trimmed = link.trim();
        if trimmed.is_empty() {
            return None;
        }

        let id = link_pattern()
            .captures(trimmed)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str())
            .unwrap_or(trimmed);

        Some(Self(id.to_string()))
    }

    /// Use the trimmed input verbatim (local file paths, test fixtures)
    pub fn literal(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
