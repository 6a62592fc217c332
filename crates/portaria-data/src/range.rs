//! A1-notation helpers and the fixed sheet layout.
//!
//! The sheets this tool reads keep a few banner rows on top, the column
//! names on a fixed row (4 by default) and data rows below it.

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Convert column letters to a 0-indexed number (A=0, B=1, ..., Z=25, AA=26)
pub fn column_to_index(col: &str) -> Result<u32> {
    let col = col.trim();
    if col.is_empty() {
        return Err(DataError::InvalidRange("Empty column reference".to_string()));
    }

    let mut result: u32 = 0;
    for c in col.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(DataError::InvalidRange(format!(
                "Invalid character '{}' in column reference '{}'",
                c, col
            )));
        }
        let value = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add(value))
            .ok_or_else(|| DataError::InvalidRange(format!("Column '{}' is too large", col)))?;
    }
    Ok(result - 1)
}

/// Convert a 0-indexed column number back to letters (0=A, 26=AA)
pub fn index_to_column(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Parse a cell reference like "A1" into (column, row) as 0-indexed
pub fn parse_cell_ref(cell: &str) -> Result<(u32, u32)> {
    let cell = cell.trim().to_uppercase();

    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| DataError::InvalidRange(format!("Invalid cell reference '{}'", cell)))?;
    let (col_str, row_str) = cell.split_at(split);

    let col = column_to_index(col_str)?;
    let row: u32 = row_str
        .parse()
        .map_err(|_| DataError::InvalidRange(format!("Invalid row number '{}'", row_str)))?;

    if row == 0 {
        return Err(DataError::InvalidRange(
            "Row number must be >= 1".to_string(),
        ));
    }

    Ok((col, row - 1))
}

/// Quote a tab name for use in an A1 range (`'My Tab'!A1`)
pub fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// Where the header sits and how wide a read goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// 1-indexed row holding the column names
    pub header_row: u32,
    /// Last column read (inclusive)
    pub last_column: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 4,
            last_column: "ZZ".to_string(),
        }
    }
}

impl SheetLayout {
    /// Validate the layout values
    pub fn validate(&self) -> Result<()> {
        if self.header_row == 0 {
            return Err(DataError::InvalidRange(
                "Header row must be >= 1".to_string(),
            ));
        }
        column_to_index(&self.last_column)?;
        Ok(())
    }

    /// 0-indexed offset of the header row
    pub fn header_offset(&self) -> usize {
        self.header_row.saturating_sub(1) as usize
    }

    /// 0-indexed offset of the first data row
    pub fn data_offset(&self) -> usize {
        self.header_row as usize
    }

    /// Number of columns covered by a full-width read
    pub fn column_count(&self) -> Result<usize> {
        Ok(column_to_index(&self.last_column)? as usize + 1)
    }

    /// Range covering the header row only
    pub fn header_range(&self, tab: &str) -> String {
        format!(
            "{}!A{}:{}{}",
            quote_tab(tab),
            self.header_row,
            self.last_column,
            self.header_row
        )
    }

    /// Range covering every row across the full column range
    pub fn full_range(&self, tab: &str) -> String {
        format!("{}!A1:{}", quote_tab(tab), self.last_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_index() {
        assert_eq!(column_to_index("A").unwrap(), 0);
        assert_eq!(column_to_index("C").unwrap(), 2);
        assert_eq!(column_to_index("Z").unwrap(), 25);
        assert_eq!(column_to_index("AA").unwrap(), 26);
        assert_eq!(column_to_index("AH").unwrap(), 33);
        assert_eq!(column_to_index("az").unwrap(), 51);
        assert_eq!(column_to_index("ZZ").unwrap(), 701);
    }

    #[test]
    fn test_column_to_index_invalid() {
        assert!(column_to_index("").is_err());
        assert!(column_to_index("A1").is_err());
        assert!(column_to_index("É").is_err());
    }

    #[test]
    fn test_index_to_column() {
        assert_eq!(index_to_column(0), "A");
        assert_eq!(index_to_column(25), "Z");
        assert_eq!(index_to_column(26), "AA");
        assert_eq!(index_to_column(33), "AH");
        assert_eq!(index_to_column(701), "ZZ");
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1").unwrap(), (0, 0));
        assert_eq!(parse_cell_ref("b2").unwrap(), (1, 1));
        assert_eq!(parse_cell_ref("AB10").unwrap(), (27, 9));
        assert!(parse_cell_ref("A0").is_err());
        assert!(parse_cell_ref("A").is_err());
        assert!(parse_cell_ref("1").is_err());
    }

    #[test]
    fn test_layout_ranges() {
        let layout = SheetLayout::default();
        assert_eq!(layout.header_range("Dados"), "'Dados'!A4:ZZ4");
        assert_eq!(layout.full_range("Dados"), "'Dados'!A1:ZZ");
        assert_eq!(layout.header_offset(), 3);
        assert_eq!(layout.data_offset(), 4);
        assert_eq!(layout.column_count().unwrap(), 702);
    }

    #[test]
    fn test_quote_tab_escapes_apostrophe() {
        assert_eq!(quote_tab("Escola d'Água"), "'Escola d''Água'");
    }

    #[test]
    fn test_layout_validate() {
        assert!(SheetLayout::default().validate().is_ok());
        let bad = SheetLayout {
            header_row: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
