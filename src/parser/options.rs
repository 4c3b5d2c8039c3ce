//! Parser configuration: where the table name lives, where column
//! definitions start and which sheet column holds which attribute.
use crate::error::TableDefError;
use crate::parser::ParseError;
use crate::parser::Parser;
use crate::spreadsheet::reference::col_to_index;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Maps a column name to the name of its generated index key.
pub type KeyNameFn = Box<dyn Fn(&str) -> String>;

/// Column designators (spreadsheet letter codes) of the definition block.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnLayout {
    /// Row number cell; an empty value ends the column list
    pub no: String,
    pub name: String,
    /// Type cell; an empty value marks a separator row
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "pkey")]
    pub primary_key: String,
    pub not_null: String,
    pub unique: String,
    pub index: String,
    pub option: String,
    pub comment: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout {
            no: "B".to_owned(),
            name: "C".to_owned(),
            kind: "D".to_owned(),
            primary_key: "E".to_owned(),
            not_null: "F".to_owned(),
            unique: "G".to_owned(),
            index: "H".to_owned(),
            option: "I".to_owned(),
            comment: "J".to_owned(),
        }
    }
}

/// [`ColumnLayout`] with every designator converted to a column index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ColumnIndexes {
    pub(crate) no: usize,
    pub(crate) name: usize,
    pub(crate) kind: usize,
    pub(crate) primary_key: usize,
    pub(crate) not_null: usize,
    pub(crate) unique: usize,
    pub(crate) index: usize,
    pub(crate) option: usize,
    pub(crate) comment: usize,
}

impl TryFrom<&ColumnLayout> for ColumnIndexes {
    type Error = TableDefError;

    fn try_from(layout: &ColumnLayout) -> Result<Self, Self::Error> {
        Ok(ColumnIndexes {
            no: designator("no", &layout.no)?,
            name: designator("name", &layout.name)?,
            kind: designator("type", &layout.kind)?,
            primary_key: designator("pkey", &layout.primary_key)?,
            not_null: designator("not null", &layout.not_null)?,
            unique: designator("unique", &layout.unique)?,
            index: designator("index", &layout.index)?,
            option: designator("option", &layout.option)?,
            comment: designator("comment", &layout.comment)?,
        })
    }
}

fn designator(field: &str, value: &str) -> Result<usize, TableDefError> {
    col_to_index(value).ok_or_else(|| {
        ParseError::Configuration(format!("Unable to convert column string for {field}: '{value}'")).into()
    })
}

/// Builds a [`Parser`]. Every option is validated by [`ParserBuilder::build`].
pub struct ParserBuilder {
    table_name_row: usize,
    table_name_column: String,
    start_row: usize,
    layout: ColumnLayout,
    bool_string: String,
    key_name: KeyNameFn,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        ParserBuilder {
            table_name_row: 1,
            table_name_column: "C".to_owned(),
            start_row: 4,
            layout: ColumnLayout::default(),
            bool_string: "yes".to_owned(),
            key_name: Box::new(|name| format!("{name}_key")),
        }
    }
}

impl fmt::Debug for ParserBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserBuilder")
            .field("table_name_row", &self.table_name_row)
            .field("table_name_column", &self.table_name_column)
            .field("start_row", &self.start_row)
            .field("layout", &self.layout)
            .field("bool_string", &self.bool_string)
            .finish_non_exhaustive()
    }
}

impl ParserBuilder {
    /// Position of the table name cell: zero-based row and column letters.
    pub fn table_name_pos(mut self, row: usize, col: &str) -> Self {
        self.table_name_row = row;
        self.table_name_column = col.to_owned();
        self
    }

    /// Zero-based row of the first column definition.
    pub fn start_row(mut self, row: usize) -> Self {
        self.start_row = row;
        self
    }

    /// Cell value meaning "true" for the flag columns.
    pub fn bool_string(mut self, value: &str) -> Self {
        self.bool_string = value.to_owned();
        self
    }

    /// Function naming the index key generated for an indexed column.
    pub fn key_name_fn<F>(mut self, key_name: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        self.key_name = Box::new(key_name);
        self
    }

    pub fn layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn build(self) -> Result<Parser, TableDefError> {
        if self.start_row <= self.table_name_row {
            Err(ParseError::Configuration(format!(
                "Start row ({}) must be greater than the table name row ({})",
                self.start_row, self.table_name_row
            )))?
        }
        let table_name_column = designator("table name", &self.table_name_column)?;
        let columns = ColumnIndexes::try_from(&self.layout)?;
        Ok(Parser {
            table_name_row: self.table_name_row,
            table_name_column,
            start_row: self.start_row,
            columns,
            bool_string: self.bool_string,
            key_name: self.key_name,
            common_columns: None,
        })
    }
}
