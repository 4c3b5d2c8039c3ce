//! MySQL-flavoured `CREATE TABLE` statements.
use crate::database::Column;
use crate::database::Key;
use crate::database::Table;
use crate::error::TableDefError;
use crate::render::Hooks;
use crate::render::Renderer;
use std::io::Write;

const HEADER: &str = "# This file generated by tdconverter. DO NOT EDIT.\n";

/// Renders each table as `DROP TABLE IF EXISTS` followed by `CREATE TABLE`.
///
/// ```text
/// DROP TABLE IF EXISTS sample_table;
/// CREATE TABLE `sample_table` (
///     `id` INT UNSIGNED NOT NULL AUTO_INCREMENT COMMENT 'this is id!',
///     `bar` VARCHAR(32),
///     PRIMARY KEY (id),
///     INDEX `bar_key` (bar)
/// );
/// ```
#[derive(Debug)]
pub struct SqlRenderer {
    hooks: Hooks,
}

impl Default for SqlRenderer {
    fn default() -> Self {
        SqlRenderer {
            hooks: Hooks::default().header(|w, _| w.write_all(HEADER.as_bytes())),
        }
    }
}

impl SqlRenderer {
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

    fn column_definition(&self, column: &Column) -> String {
        let mut definition = format!("`{}` {}", column.name, self.map_type(&column.kind));
        if column.not_null {
            definition.push_str(" NOT NULL");
        }
        if column.unique {
            definition.push_str(" UNIQUE");
        }
        if !column.option.is_empty() {
            definition.push(' ');
            definition.push_str(&column.option);
        }
        if !column.comment.is_empty() {
            definition.push_str(&format!(" COMMENT '{}'", column.comment.replace('\'', "''")));
        }
        definition
    }
}

fn key_definition(prefix: &str, key: &Key) -> String {
    format!("{} `{}` ({})", prefix, key.name, key.columns.join(", "))
}

impl Renderer for SqlRenderer {
    fn extension(&self) -> &str {
        "sql"
    }

    fn write_table(&self, writer: &mut dyn Write, table: &Table) -> Result<(), TableDefError> {
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|column| self.column_definition(column))
            .collect();
        if !table.primary_key_columns.is_empty() {
            lines.push(format!("PRIMARY KEY ({})", table.primary_key_columns.join(", ")));
        }
        lines.extend(table.index_keys.iter().map(|key| key_definition("INDEX", key)));
        lines.extend(table.unique_keys.iter().map(|key| key_definition("UNIQUE KEY", key)));

        writeln!(writer, "DROP TABLE IF EXISTS {};", table.name)?;
        writeln!(writer, "CREATE TABLE `{}` (", table.name)?;
        for (i, line) in lines.iter().enumerate() {
            let separator = if i + 1 < lines.len() { "," } else { "" };
            writeln!(writer, "    {line}{separator}")?;
        }
        writeln!(writer, ");")?;
        Ok(())
    }

    fn map_type(&self, kind: &str) -> String {
        kind.trim().to_owned()
    }

    fn hooks(&self) -> Option<&Hooks> {
        Some(&self.hooks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::TableSet;
    use crate::render::render;
    use crate::render::render_table;
    use crate::render::MemorySink;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn sample_table() -> Table {
        Table {
            name: "sample_table".to_owned(),
            columns: vec![
                Column::new("id", "INT UNSIGNED").primary_key().not_null().option("AUTO_INCREMENT").comment("this is id!"),
                Column::new("foo", "VARCHAR(32)").not_null().unique(),
                Column::new("bar", "VARCHAR(32)").index(),
                Column::new("created_at", "TIMESTAMP NULL").option("DEFAULT CURRENT_TIMESTAMP").common(),
                Column::new("updated_at", "TIMESTAMP NULL").option("DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP").common(),
                Column::new("deleted_at", "TIMESTAMP NULL").common(),
            ],
            primary_key_columns: vec!["id".to_owned()],
            unique_keys: vec![],
            index_keys: vec![Key::new("bar_key", ["bar"])],
        }
    }

    fn to_string(renderer: &SqlRenderer, table: &Table) -> String {
        let mut buffer = Vec::new();
        renderer.write_table(&mut buffer, table).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn standard_output() {
        assert_eq!(
            to_string(&SqlRenderer::new(), &sample_table()),
            "DROP TABLE IF EXISTS sample_table;\n\
             CREATE TABLE `sample_table` (\n\
             \x20   `id` INT UNSIGNED NOT NULL AUTO_INCREMENT COMMENT 'this is id!',\n\
             \x20   `foo` VARCHAR(32) NOT NULL UNIQUE,\n\
             \x20   `bar` VARCHAR(32),\n\
             \x20   `created_at` TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,\n\
             \x20   `updated_at` TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,\n\
             \x20   `deleted_at` TIMESTAMP NULL,\n\
             \x20   PRIMARY KEY (id),\n\
             \x20   INDEX `bar_key` (bar)\n\
             );\n"
        );
    }

    #[test]
    fn unique_key_and_composite_primary_key() {
        let table = Table {
            name: "sample_table".to_owned(),
            columns: vec![
                Column::new("id", "INT UNSIGNED").primary_key().not_null(),
                Column::new("seq", "INT").primary_key().not_null(),
                Column::new("bar", "VARCHAR(32)").index(),
                Column::new("baz", "VARCHAR(32)"),
            ],
            primary_key_columns: vec!["id".to_owned(), "seq".to_owned()],
            unique_keys: vec![Key::new("bar_baz_key", ["bar", "baz"])],
            index_keys: vec![Key::new("bar_key", ["bar"])],
        };
        assert_eq!(
            to_string(&SqlRenderer::new(), &table),
            "DROP TABLE IF EXISTS sample_table;\n\
             CREATE TABLE `sample_table` (\n\
             \x20   `id` INT UNSIGNED NOT NULL,\n\
             \x20   `seq` INT NOT NULL,\n\
             \x20   `bar` VARCHAR(32),\n\
             \x20   `baz` VARCHAR(32),\n\
             \x20   PRIMARY KEY (id, seq),\n\
             \x20   INDEX `bar_key` (bar),\n\
             \x20   UNIQUE KEY `bar_baz_key` (bar, baz)\n\
             );\n"
        );
    }

    #[test]
    fn no_primary_key() {
        let mut table = Table::new("logs");
        table.columns.push(Column::new("message", " TEXT "));
        assert_eq!(
            to_string(&SqlRenderer::new(), &table),
            "DROP TABLE IF EXISTS logs;\nCREATE TABLE `logs` (\n    `message` TEXT\n);\n"
        );
    }

    #[test]
    fn comment_quotes_are_doubled() {
        let mut table = Table::new("users");
        table.columns.push(Column::new("name", "TEXT").comment("user's name"));
        assert!(to_string(&SqlRenderer::new(), &table).contains("`name` TEXT COMMENT 'user''s name'\n"));
    }

    #[test]
    fn absent_renderer_or_table() {
        let mut buffer = Vec::new();
        render_table(None, Some(&sample_table()), &mut buffer).unwrap();
        render_table(Some(&SqlRenderer::new()), None, &mut buffer).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn default_hooks_and_extension() {
        let renderer = SqlRenderer::new();
        assert_eq!(renderer.extension(), "sql");
        let hooks = renderer.hooks().unwrap();
        assert!(hooks.header.is_some());
        assert!(hooks.table_header.is_none());
        assert!(hooks.table_footer.is_none());
        assert!(hooks.footer.is_none());
    }

    #[test]
    fn custom_hooks_in_pipeline() {
        let mut renderer = SqlRenderer::new();
        let hooks = renderer.hooks_mut();
        hooks.table_header = Some(Box::new(|w: &mut dyn Write, _: &Table| writeln!(w, "# table header")));
        hooks.table_footer = Some(Box::new(|w: &mut dyn Write, _: &Table| writeln!(w, "# table footer")));
        hooks.footer = Some(Box::new(|w: &mut dyn Write, _: &TableSet| writeln!(w, "# footer")));

        let mut table = sample_table();
        table.columns.truncate(2);
        table.index_keys.clear();
        let table_set = TableSet::new("sample_table_set", vec![table]);
        let mut sink = MemorySink::default();
        render(&renderer, Some(&table_set), false, Path::new("output_dir"), &mut sink).unwrap();

        assert_eq!(
            sink.unit("output_dir/sample_table_set.sql").unwrap(),
            "# This file generated by tdconverter. DO NOT EDIT.\n\
             # table header\n\
             DROP TABLE IF EXISTS sample_table;\n\
             CREATE TABLE `sample_table` (\n\
             \x20   `id` INT UNSIGNED NOT NULL AUTO_INCREMENT COMMENT 'this is id!',\n\
             \x20   `foo` VARCHAR(32) NOT NULL UNIQUE,\n\
             \x20   PRIMARY KEY (id)\n\
             );\n\
             # table footer\n\
             # footer\n"
        );
    }

    #[test]
    fn hooks_can_be_cleared() {
        let renderer = SqlRenderer::new().with_hooks(Hooks::default());
        let table_set = TableSet::new("s", vec![Table::new("t")]);
        let mut sink = MemorySink::default();
        render(&renderer, Some(&table_set), false, Path::new("o"), &mut sink).unwrap();
        assert_eq!(sink.unit("o/s.sql").unwrap(), "DROP TABLE IF EXISTS t;\nCREATE TABLE `t` (\n);\n");
    }
}
