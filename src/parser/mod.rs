//! # Row-to-Schema Parser
//!
//! Reads a table definition sheet laid out as a block of rows, one per
//! column:
//!
//! ```text
//!      A   B    C            D             E     F         G       H      I               J
//!  1
//!  2           sample_table
//!  3
//!  4       No.  Name         Type          PK    Not Null  Unique  Index  Option          Comment
//!  5       1    id           INT UNSIGNED  yes   yes                      AUTO_INCREMENT  this is id!
//!  6       2    foo          VARCHAR(32)         yes       yes
//!  7       3    (blank type: skipped)
//!  8       4    bar          VARCHAR(32)                           yes
//!  9            (blank number: end of list)
//! ```
//!
//! Positions are configurable through [`ParserBuilder`]. A parser can also
//! hold a set of common columns, read once from a separate sheet, which are
//! appended to every table it parses afterwards.
use crate::database::Column;
use crate::database::Key;
use crate::database::Table;
use crate::database::TableSet;
use crate::error::ResultMessage;
use crate::error::TableDefError;
use crate::spreadsheet::Grid;
use crate::spreadsheet::GridRow;
use crate::spreadsheet::Sheet;
use thiserror::Error;
use tracing::debug;

pub mod options;

pub use options::ColumnLayout;
pub use options::KeyNameFn;
pub use options::ParserBuilder;
use options::ColumnIndexes;

#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid parser options, detected when the parser is built
    #[error("{0}")]
    Configuration(String),

    #[error("Table name is required")]
    MissingTableName,

    #[error("The length of table columns must not be zero")]
    EmptyTable,

    /// A typed column row without a name; `row` is one-based
    #[error("The column name is required (row={row})")]
    MissingColumnName { row: usize },

    /// A common column is flagged as primary key or index
    #[error("The common column '{name}' must not {reason}")]
    InvalidCommonColumn { name: String, reason: &'static str },

    #[error("The common columns are already set")]
    AlreadySet,
}

/// Parses definition sheets into [`Table`]s.
pub struct Parser {
    pub(crate) table_name_row: usize,
    pub(crate) table_name_column: usize,
    pub(crate) start_row: usize,
    pub(crate) columns: ColumnIndexes,
    pub(crate) bool_string: String,
    pub(crate) key_name: KeyNameFn,
    pub(crate) common_columns: Option<Vec<Column>>,
}

impl Parser {
    pub fn builder() -> ParserBuilder {
        ParserBuilder::default()
    }

    pub fn table_name_row(&self) -> usize {
        self.table_name_row
    }

    pub fn table_name_column(&self) -> usize {
        self.table_name_column
    }

    pub fn start_row(&self) -> usize {
        self.start_row
    }

    /// Common columns, once set.
    pub fn common_columns(&self) -> Option<&[Column]> {
        self.common_columns.as_deref()
    }

    /// Parses a sheet of shared columns and stores them for every later [`Parser::parse`].
    ///
    /// Can succeed only once. Common columns must not be primary keys or indexed;
    /// on any failure the stored state is left untouched.
    pub fn set_common_columns<G: Grid>(&mut self, grid: &G) -> Result<(), TableDefError> {
        if self.common_columns.is_some() {
            Err(ParseError::AlreadySet)?
        }
        let table = self.parse_rows(grid, true)?;
        debug!(columns = table.columns.len(), "common columns set");
        self.common_columns = Some(table.columns);
        Ok(())
    }

    /// Parses a definition sheet into a table, appending the common columns if any.
    pub fn parse<G: Grid>(&self, grid: &G) -> Result<Table, TableDefError> {
        if grid.value(self.table_name_row, self.table_name_column).is_empty() {
            Err(ParseError::MissingTableName)?
        }
        let mut table = self.parse_rows(grid, false)?;
        if let Some(common_columns) = &self.common_columns {
            table.columns.extend(common_columns.iter().cloned());
        }
        debug!(
            table = table.name.as_str(),
            columns = table.columns.len(),
            index_keys = table.index_keys.len(),
            "parsed table"
        );
        Ok(table)
    }

    /// Parses every sheet, in order, into a named table set.
    pub fn parse_sheets(&self, name: &str, sheets: &[Sheet]) -> Result<TableSet, TableDefError> {
        let mut tables = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let table = self
                .parse(sheet)
                .with_prefix(&format!("Unable to parse sheet information (sheetname={})", sheet.name))?;
            tables.push(table);
        }
        Ok(TableSet::new(name, tables))
    }

    fn parse_rows<G: Grid>(&self, grid: &G, common: bool) -> Result<Table, TableDefError> {
        let mut table = Table::new(grid.value(self.table_name_row, self.table_name_column));
        for row in grid.rows().skip(self.start_row) {
            if row.value(self.columns.no).is_empty() {
                break;
            }
            if row.value(self.columns.kind).is_empty() {
                debug!(row = row.index(), "skipped row without type");
                continue;
            }
            if row.value(self.columns.name).is_empty() {
                Err(ParseError::MissingColumnName { row: row.index() + 1 })?
            }

            let column = self.read_column(&row, common);
            if common {
                if column.primary_key {
                    Err(ParseError::InvalidCommonColumn { name: column.name.to_owned(), reason: "be PK" })?
                }
                if column.index {
                    Err(ParseError::InvalidCommonColumn { name: column.name.to_owned(), reason: "have index" })?
                }
            }

            if column.primary_key {
                table.primary_key_columns.push(column.name.to_owned());
            }
            if column.index {
                let key_name = (self.key_name)(&column.name);
                table.index_keys.push(Key::new(&key_name, [column.name.as_str()]));
            }
            table.columns.push(column);
        }

        if table.columns.is_empty() {
            Err(ParseError::EmptyTable)?
        }
        Ok(table)
    }

    fn read_column<G: Grid>(&self, row: &GridRow<'_, G>, common: bool) -> Column {
        let flag = |col: usize| row.value(col) == self.bool_string;
        Column {
            name: row.value(self.columns.name).to_owned(),
            kind: row.value(self.columns.kind).to_owned(),
            primary_key: flag(self.columns.primary_key),
            not_null: flag(self.columns.not_null),
            unique: flag(self.columns.unique),
            index: flag(self.columns.index),
            option: row.value(self.columns.option).to_owned(),
            comment: row.value(self.columns.comment).to_owned(),
            is_common: common,
        }
    }
}
