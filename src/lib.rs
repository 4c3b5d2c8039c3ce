//! # Table Definition Converter
//!
//! Turns table definitions kept in spreadsheets into SQL DDL and Go structs.
//!
//! Each worksheet describes one table: its name sits in a fixed cell and its
//! columns follow as rows (number, name, type, primary key, not null, unique,
//! index, option, comment). A separate sheet may define common columns that
//! are appended to every table.
//!
//! ## Pipeline
//!
//! 1. [`spreadsheet`] opens `.xlsx`/`.xlsm`/`.ods` workbooks into in-memory
//!    [`Sheet`]s, or any other source implementing [`Grid`]
//! 2. [`parser::Parser`] turns each grid into a [`Table`]
//! 3. [`render::render`] writes a [`TableSet`] through a [`render::Renderer`]
//!    such as [`render::SqlRenderer`] or [`render::GoRenderer`], as one file
//!    or one file per table
//!
//! ```no_run
//! use std::path::Path;
//! use tabledef::parser::Parser;
//! use tabledef::render::{render, FileSink, SqlRenderer};
//! use tabledef::spreadsheet::{self, Criteria};
//!
//! # fn main() -> Result<(), tabledef::TableDefError> {
//! let mut workbook = spreadsheet::open("tables.xlsx")?;
//! let sheets = workbook.read_sheets(&Criteria::all())?;
//! let table_set = Parser::builder().build()?.parse_sheets("tables", &sheets)?;
//! render(&SqlRenderer::new(), Some(&table_set), false, Path::new("out/sql"), &mut FileSink)?;
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod database;
pub mod error;
mod helpers;
pub mod parser;
pub mod render;
pub mod spreadsheet;

pub use database::Column;
pub use database::Key;
pub use database::Table;
pub use database::TableSet;
pub use error::ResultMessage;
pub use error::TableDefError;
pub use spreadsheet::Grid;
pub use spreadsheet::Sheet;
