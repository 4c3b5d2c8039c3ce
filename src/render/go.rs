//! Go struct definitions, one pointer-typed field per column.
use crate::database::Table;
use crate::error::TableDefError;
use crate::helpers::case::to_camel;
use crate::helpers::case::to_lower_camel;
use crate::render::Hooks;
use crate::render::Renderer;
use regex::Regex;
use std::io::Write;
use tracing::warn;

const HEADER: &str = "// This file generated by tdconverter. DO NOT EDIT.\npackage main\n\nimport(\n\t\"time\"\n)\n\n";

/// Marker written for column types without a Go counterpart.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// Upper-cased words rewritten after camel-casing field names, applied in order.
const ACRONYMS: [(&str, &str); 5] = [("Id", "ID"), ("Ip", "IP"), ("Api", "API"), ("Url", "URL"), ("Http", "HTTP")];

#[derive(Debug)]
pub struct GoRenderer {
    hooks: Hooks,
    /// Leading letters of a type expression followed by a space or `(`
    type_name: Regex,
}

impl Default for GoRenderer {
    fn default() -> Self {
        GoRenderer {
            hooks: Hooks::default().header(|w, _| w.write_all(HEADER.as_bytes())),
            type_name: Regex::new(r"^([a-zA-Z]+)[ (].*$").expect("Hardcode regex pattern"),
        }
    }
}

impl GoRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all hooks, including the default header.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// `sample_table` → `sampleTable`
    pub fn struct_name(&self, table_name: &str) -> String {
        to_lower_camel(table_name)
    }

    /// `user_id` → `UserID`
    pub fn field_name(&self, column_name: &str) -> String {
        ACRONYMS
            .iter()
            .fold(to_camel(column_name), |name, (word, acronym)| name.replace(word, acronym))
    }
}

impl Renderer for GoRenderer {
    fn extension(&self) -> &str {
        "go"
    }

    fn write_table(&self, writer: &mut dyn Write, table: &Table) -> Result<(), TableDefError> {
        writeln!(writer, "type {} struct {{", self.struct_name(&table.name))?;
        for column in &table.columns {
            let kind = self.map_type(&column.kind);
            if kind == UNKNOWN_TYPE {
                warn!(table = table.name.as_str(), column = column.name.as_str(), kind = column.kind.as_str(), "no Go type for column");
            }
            writeln!(writer, "\t{} {}", self.field_name(&column.name), kind)?;
        }
        writeln!(writer, "}}")?;
        Ok(())
    }

    fn map_type(&self, kind: &str) -> String {
        let base = self.type_name.replace(kind, "$1").to_uppercase();
        let mapped = match base.as_str() {
            "INT" | "TINYINT" | "BIGINT" => "*int",
            "DOUBLE" => "*float32",
            "CHAR" | "VARCHAR" | "TEXT" | "ENUM" => "*string",
            "BOOLEAN" => "*bool",
            "TIMESTAMP" | "DATE" | "TIME" => "*time.Time",
            "DECIMAL" => "*decimal.Decimal",
            _ => UNKNOWN_TYPE,
        };
        mapped.to_owned()
    }

    fn hooks(&self) -> Option<&Hooks> {
        Some(&self.hooks)
    }
}
