//! # Spreadsheet Access Module
//!
//! Everything the parser needs to know about a spreadsheet is the [`Grid`]
//! contract: a ragged 2-D block of text cells addressed by zero-based row and
//! column indexes, where unset cells read as the empty string.
//!
//! This module also ships local workbook readers for Office Open XML
//! (`.xlsx`, `.xlsm`) and OpenDocument (`.ods`) files which produce in-memory
//! [`Sheet`]s, one per worksheet.
use crate::error::TableDefError;
use std::path::Path;
use thiserror::Error;

pub mod criteria;
pub mod ods;
pub mod reference;
pub mod sheet;
pub mod xlsx;

pub use criteria::Criteria;
pub use ods::OdsWorkbook;
pub use sheet::Sheet;
pub use xlsx::XlsxWorkbook;

/// Errors raised while opening or reading workbooks.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A required member is missing from the workbook archive
    #[error("Missing '{0}' in workbook")]
    FileError(String),

    /// The file extension is not one of the supported workbook formats
    #[error("Cannot detect workbook format for '{0}'")]
    UnsupportedFormat(String),

    /// The workbook contains no worksheet
    #[error("Workbook '{0}' contains no sheet")]
    EmptyWorkbook(String),

    /// No worksheet matched the requested name
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    /// A column designator or cell reference could not be converted to indexes
    #[error("Invalid cell reference '{0}'")]
    InvalidReference(String),

    /// The `mimetype` member of an OpenDocument archive is not a spreadsheet
    #[error("Invalid ODS MIME type")]
    MimeTypeError,
}

/// Read access to a 2-D block of cell values.
pub trait Grid {
    /// Returns the value at `(row, col)`, or `""` when the cell is unset or out of range.
    fn value(&self, row: usize, col: usize) -> &str;

    /// Number of rows, including trailing rows whose cells are all unset.
    fn row_count(&self) -> usize;

    /// Iterates over every row in increasing order.
    fn rows(&self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows { grid: self, next: 0 }
    }
}

impl<G: Grid> Grid for &G {
    fn value(&self, row: usize, col: usize) -> &str {
        (**self).value(row, col)
    }

    fn row_count(&self) -> usize {
        (**self).row_count()
    }
}

/// A single row of a [`Grid`].
#[derive(Debug)]
pub struct GridRow<'a, G> {
    grid: &'a G,
    index: usize,
}

impl<'a, G: Grid> GridRow<'a, G> {
    /// Zero-based row index within the grid
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the value of the given column, `""` when unset.
    pub fn value(&self, col: usize) -> &'a str {
        self.grid.value(self.index, col)
    }
}

/// Iterator over the rows of a [`Grid`].
#[derive(Debug)]
pub struct Rows<'a, G> {
    grid: &'a G,
    next: usize,
}

impl<'a, G: Grid> Iterator for Rows<'a, G> {
    type Item = GridRow<'a, G>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.grid.row_count() {
            return None;
        }
        let row = GridRow {
            grid: self.grid,
            index: self.next,
        };
        self.next += 1;
        Some(row)
    }
}

/// A workbook file holding one or more worksheets.
pub trait Workbook {
    /// Path of the workbook file
    fn name(&self) -> String;

    /// Worksheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads every worksheet accepted by the criteria, in workbook order.
    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, TableDefError>;

    /// Reads the worksheet with exactly the given name.
    fn read_sheet(&mut self, name: &str) -> Result<Sheet, TableDefError> {
        let criteria = Criteria::exact(name)?;
        self.read_sheets(&criteria)?
            .into_iter()
            .next()
            .ok_or_else(|| SpreadsheetError::SheetNotFound(name.to_owned()).into())
    }
}

/// Opens a workbook, choosing the reader from the file extension.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Box<dyn Workbook>, TableDefError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxWorkbook::open(path)?)),
        Some("ods") => Ok(Box::new(OdsWorkbook::open(path)?)),
        _ => Err(SpreadsheetError::UnsupportedFormat(path.display().to_string()))?,
    }
}
