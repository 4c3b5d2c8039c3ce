use crate::database::column::Column;
use crate::database::column::Key;

/// A table definition read from one sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    /// Table/sheet name
    pub name: String,
    /// Column definitions in declaration order
    pub columns: Vec<Column>,
    /// Names of the primary key columns in declaration order
    pub primary_key_columns: Vec<String>,
    /// Unique keys, supplied after parsing
    pub unique_keys: Vec<Key>,
    /// Secondary indexes
    pub index_keys: Vec<Key>,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Table {
            name: name.to_owned(),
            ..Default::default()
        }
    }
}

/// The tables of one definition workbook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableSet {
    /// Usually the workbook title
    pub name: String,
    pub tables: Vec<Table>,
}

impl TableSet {
    pub fn new(name: &str, tables: Vec<Table>) -> Self {
        TableSet {
            name: name.to_owned(),
            tables,
        }
    }
}

