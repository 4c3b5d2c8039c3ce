//! # Configuration File
//!
//! `tdconverter.json` names the definition workbooks by alias and may
//! override where the parser looks for things:
//!
//! ```json
//! {
//!   "sheets": [ { "name": "Orders DB", "alias": "orders", "path": "defs/orders.xlsx" } ],
//!   "layout": { "table_name": "C2", "start_row": 4, "bool_string": "yes",
//!               "key_prefix": "", "key_suffix": "_key",
//!               "columns": { "no": "B", "name": "C", "type": "D", "pkey": "E" } }
//! }
//! ```
//!
//! Every `layout` field is optional and falls back to the parser defaults.
use crate::error::ResultMessage;
use crate::error::TableDefError;
use crate::parser::ColumnLayout;
use crate::parser::ParserBuilder;
use crate::spreadsheet::reference::index_to_col;
use crate::spreadsheet::reference::parse_reference;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE: &str = "tdconverter.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Workbook path must not be empty ({0})")]
    EmptyPath(String),

    #[error("Alias must not be duplicated ({0})")]
    DuplicateAlias(String),

    #[error("Workbook '{0}' is neither a configured alias nor an existing file")]
    UnknownWorkbook(String),

    #[error("Configuration must be a JSON object")]
    NotAnObject,
}

/// One configured definition workbook.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SheetEntry {
    /// Display name, also used to name the rendered table set
    pub name: String,
    #[serde(default)]
    pub alias: String,
    pub path: PathBuf,
}

/// Parser overrides; see [`ParserBuilder`] for the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Layout {
    /// Cell reference of the table name, e.g. `C2`
    pub table_name: String,
    /// Zero-based index of the first column definition row
    pub start_row: usize,
    pub bool_string: String,
    pub key_prefix: String,
    pub key_suffix: String,
    pub columns: ColumnLayout,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            table_name: "C2".to_owned(),
            start_row: 4,
            bool_string: "yes".to_owned(),
            key_prefix: String::new(),
            key_suffix: "_key".to_owned(),
            columns: ColumnLayout::default(),
        }
    }
}

impl Layout {
    /// Turns the layout into a parser builder; the builder validates it on `build()`.
    pub fn parser_builder(&self) -> Result<ParserBuilder, TableDefError> {
        let (row, col) = parse_reference(&self.table_name).with_prefix("Invalid table name cell")?;
        let prefix = self.key_prefix.to_owned();
        let suffix = self.key_suffix.to_owned();
        Ok(ParserBuilder::default()
            .table_name_pos(row, &index_to_col(col))
            .start_row(self.start_row)
            .bool_string(&self.bool_string)
            .key_name_fn(move |name| format!("{prefix}{name}{suffix}"))
            .layout(self.columns.clone()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
    #[serde(default)]
    pub layout: Layout,
}

impl Config {
    /// Reads and validates a configuration file. A missing file is `Ok(None)`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>, TableDefError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file");
                return Ok(None);
            }
            Err(e) => Err(e)?,
        };
        let config = Self::from_json(&text)
            .with_prefix(&format!("Unable to read config file ({})", path.display()))?;
        Ok(Some(config))
    }

    /// Parses and validates a configuration document.
    pub fn from_json(text: &str) -> Result<Self, TableDefError> {
        // serde would otherwise accept `[]` as a struct written positionally
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            Err(ConfigError::NotAnObject)?;
        }
        let config: Config = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut aliases = HashSet::new();
        for sheet in &self.sheets {
            if sheet.path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath(sheet.name.to_owned()));
            }
            if !sheet.alias.is_empty() && !aliases.insert(sheet.alias.as_str()) {
                return Err(ConfigError::DuplicateAlias(sheet.alias.to_owned()));
            }
        }
        Ok(())
    }

    /// Alias to workbook path.
    pub fn alias_map(&self) -> HashMap<&str, &Path> {
        self.sheets
            .iter()
            .filter(|sheet| !sheet.alias.is_empty())
            .map(|sheet| (sheet.alias.as_str(), sheet.path.as_path()))
            .collect()
    }

    /// Looks a workbook up by alias, then by path.
    pub fn entry(&self, name: &str) -> Option<&SheetEntry> {
        self.sheets
            .iter()
            .find(|sheet| !sheet.alias.is_empty() && sheet.alias == name)
            .or_else(|| self.sheets.iter().find(|sheet| sheet.path == Path::new(name)))
    }

    /// Resolves an alias or a literal path to a workbook path.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, TableDefError> {
        if let Some(path) = self.alias_map().get(name) {
            return Ok(path.to_path_buf());
        }
        let path = PathBuf::from(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ConfigError::UnknownWorkbook(name.to_owned()))?
        }
    }
}
