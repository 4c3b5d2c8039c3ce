//! Conversions between spreadsheet-style references and zero-based indexes.
//!
//! Columns are letter codes (`A` = 0, `Z` = 25, `AA` = 26), rows are
//! one-based numbers, so `C2` is row 1, column 2.

use crate::error::TableDefError;
use crate::spreadsheet::SpreadsheetError;
use regex::Regex;

/// Converts a column designator such as `"C"` or `"aa"` to its zero-based index.
pub fn col_to_index(col: &str) -> Option<usize> {
    if col.is_empty() || !col.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut index = 0usize;
    for letter in col.to_ascii_uppercase().bytes() {
        index = index
            .checked_mul(26)?
            .checked_add((letter - b'A') as usize + 1)?;
    }
    Some(index - 1)
}

/// Converts a one-based row number such as `"12"` to its zero-based index.
pub fn row_to_index(row: &str) -> Option<usize> {
    row.parse::<usize>().ok()?.checked_sub(1)
}

/// Converts a zero-based column index back to its letter code.
pub fn index_to_col(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parses a cell reference such as `"C2"` into zero-based `(row, col)`.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let pattern = Regex::new(r"^\$?([A-Za-z]+)\$?(\d+)$").expect("Hardcode regex pattern");
    let captures = pattern.captures(reference.trim())?;
    let col = captures.get(1).map(|matcher| matcher.as_str()).and_then(col_to_index)?;
    let row = captures.get(2).map(|matcher| matcher.as_str()).and_then(row_to_index)?;
    Some((row, col))
}

/// Formats zero-based `(row, col)` as a cell reference such as `"C2"`.
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

/// Like [`reference_to_index`], failing with [`SpreadsheetError::InvalidReference`].
pub fn parse_reference(reference: &str) -> Result<(usize, usize), TableDefError> {
    reference_to_index(reference)
        .ok_or_else(|| SpreadsheetError::InvalidReference(reference.to_owned()).into())
}
