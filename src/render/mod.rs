//! # Rendering Pipeline
//!
//! A [`Renderer`] knows how to write one [`Table`] in a target language; the
//! pipeline in [`render`] decides how tables are grouped into output units
//! and drives the optional [`Hooks`] around each table body.
//!
//! For every output unit the sequence is:
//!
//! ```text
//! header(table set)
//! table_header(table) body(table) table_footer(table)   <- one per table, separated by a blank line
//! footer(table set)
//! ```
use crate::database::Table;
use crate::database::TableSet;
use crate::error::TableDefError;
use crate::helpers::case::to_snake;
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub mod go;
pub mod sql;

pub use go::GoRenderer;
pub use sql::SqlRenderer;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Table set is nil")]
    NilInput,
}

/// Hook receiving the whole table set, used for unit headers and footers.
pub type SetHook = Box<dyn Fn(&mut dyn Write, &TableSet) -> io::Result<()>>;

/// Hook receiving the table being rendered.
pub type TableHook = Box<dyn Fn(&mut dyn Write, &Table) -> io::Result<()>>;

/// Optional callbacks written around table bodies. A missing hook writes nothing.
#[derive(Default)]
pub struct Hooks {
    pub header: Option<SetHook>,
    pub table_header: Option<TableHook>,
    pub table_footer: Option<TableHook>,
    pub footer: Option<SetHook>,
}

impl Hooks {
    pub fn header<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut dyn Write, &TableSet) -> io::Result<()> + 'static,
    {
        self.header = Some(Box::new(hook));
        self
    }

    pub fn table_header<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut dyn Write, &Table) -> io::Result<()> + 'static,
    {
        self.table_header = Some(Box::new(hook));
        self
    }

    pub fn table_footer<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut dyn Write, &Table) -> io::Result<()> + 'static,
    {
        self.table_footer = Some(Box::new(hook));
        self
    }

    pub fn footer<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut dyn Write, &TableSet) -> io::Result<()> + 'static,
    {
        self.footer = Some(Box::new(hook));
        self
    }

    fn write_set(hook: &Option<SetHook>, writer: &mut dyn Write, table_set: &TableSet) -> io::Result<()> {
        match hook {
            Some(hook) => hook(writer, table_set),
            None => Ok(()),
        }
    }

    fn write_table(hook: &Option<TableHook>, writer: &mut dyn Write, table: &Table) -> io::Result<()> {
        match hook {
            Some(hook) => hook(writer, table),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("header", &self.header.is_some())
            .field("table_header", &self.table_header.is_some())
            .field("table_footer", &self.table_footer.is_some())
            .field("footer", &self.footer.is_some())
            .finish()
    }
}

/// A target text format.
pub trait Renderer {
    /// File extension of output units, without the dot
    fn extension(&self) -> &str;

    /// Writes the complete representation of one table.
    fn write_table(&self, writer: &mut dyn Write, table: &Table) -> Result<(), TableDefError>;

    /// Maps a raw column type expression to the target's type.
    fn map_type(&self, kind: &str) -> String;

    fn hooks(&self) -> Option<&Hooks> {
        None
    }
}

/// Writes one table body; an absent renderer or table writes nothing.
pub fn render_table(
    renderer: Option<&dyn Renderer>,
    table: Option<&Table>,
    writer: &mut dyn Write,
) -> Result<(), TableDefError> {
    match (renderer, table) {
        (Some(renderer), Some(table)) => renderer.write_table(writer, table),
        _ => Ok(()),
    }
}

/// Acquires the writers output units are rendered into.
pub trait OutputSink {
    fn create(&mut self, path: &Path) -> io::Result<Box<dyn Write + '_>>;
}

/// Writes each unit to a file, creating the output directory on demand.
#[derive(Debug, Default)]
pub struct FileSink;

impl OutputSink for FileSink {
    fn create(&mut self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

/// Keeps every unit in memory, keyed by its path.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub units: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemorySink {
    /// Returns the content of a unit as text.
    pub fn unit<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.units
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

struct MemoryUnit<'a>(&'a mut Vec<u8>);

impl Write for MemoryUnit<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl OutputSink for MemorySink {
    fn create(&mut self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        let unit = self.units.entry(path.to_path_buf()).or_default();
        unit.clear();
        Ok(Box::new(MemoryUnit(unit)))
    }
}

/// Renders a table set into `dir`, as one unit or one unit per table.
///
/// Units are named `<dir>/<snake_case(name)>.<extension>`, after the table
/// set or after each table when `split` is set. The first failure aborts the
/// run; units already written are kept.
pub fn render(
    renderer: &dyn Renderer,
    table_set: Option<&TableSet>,
    split: bool,
    dir: &Path,
    sink: &mut dyn OutputSink,
) -> Result<(), TableDefError> {
    let table_set = table_set.ok_or(RenderError::NilInput)?;
    if split {
        for table in &table_set.tables {
            let path = unit_path(dir, &table.name, renderer.extension());
            write_unit(renderer, table_set, std::slice::from_ref(table), &path, sink)?;
        }
    } else {
        let path = unit_path(dir, &table_set.name, renderer.extension());
        write_unit(renderer, table_set, &table_set.tables, &path, sink)?;
    }
    Ok(())
}

fn unit_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", to_snake(name), extension))
}

fn write_unit(
    renderer: &dyn Renderer,
    table_set: &TableSet,
    tables: &[Table],
    path: &Path,
    sink: &mut dyn OutputSink,
) -> Result<(), TableDefError> {
    let mut writer = sink.create(path)?;
    let no_hooks = Hooks::default();
    let hooks = renderer.hooks().unwrap_or(&no_hooks);

    Hooks::write_set(&hooks.header, &mut *writer, table_set)?;
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        Hooks::write_table(&hooks.table_header, &mut *writer, table)?;
        renderer.write_table(&mut *writer, table)?;
        Hooks::write_table(&hooks.table_footer, &mut *writer, table)?;
    }
    Hooks::write_set(&hooks.footer, &mut *writer, table_set)?;
    writer.flush()?;

    info!(unit = %path.display(), tables = tables.len(), "rendered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct TraceRenderer {
        hooks: Hooks,
    }

    impl TraceRenderer {
        fn new() -> Self {
            let hooks = Hooks::default()
                .header(|w, table_set| writeln!(w, "header: {}", table_set.name))
                .table_header(|w, table| writeln!(w, "table header: {}", table.name))
                .table_footer(|w, table| writeln!(w, "table footer: {}", table.name))
                .footer(|w, table_set| writeln!(w, "footer: {}", table_set.name));
            TraceRenderer { hooks }
        }
    }

    impl Renderer for TraceRenderer {
        fn extension(&self) -> &str {
            "test"
        }

        fn write_table(&self, writer: &mut dyn Write, table: &Table) -> Result<(), TableDefError> {
            writeln!(writer, "table contents: {}", table.name)?;
            Ok(())
        }

        fn map_type(&self, kind: &str) -> String {
            kind.to_owned()
        }

        fn hooks(&self) -> Option<&Hooks> {
            Some(&self.hooks)
        }
    }

    struct BareRenderer;

    impl Renderer for BareRenderer {
        fn extension(&self) -> &str {
            "txt"
        }

        fn write_table(&self, writer: &mut dyn Write, table: &Table) -> Result<(), TableDefError> {
            writeln!(writer, "{}", table.name)?;
            Ok(())
        }

        fn map_type(&self, kind: &str) -> String {
            kind.to_owned()
        }
    }

    /// Fails to open one unit.
    struct FailingSink {
        inner: MemorySink,
        fail_on: PathBuf,
    }

    impl OutputSink for FailingSink {
        fn create(&mut self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
            if path == self.fail_on {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "error"));
            }
            self.inner.create(path)
        }
    }

    fn sample_table_set() -> TableSet {
        TableSet::new("SampleTableSet", vec![Table::new("sample_table_1"), Table::new("sample_table_2")])
    }

    #[test]
    fn single_unit() {
        let mut sink = MemorySink::default();
        render(&TraceRenderer::new(), Some(&sample_table_set()), false, Path::new("output_dir"), &mut sink).unwrap();

        assert_eq!(sink.units.len(), 1);
        assert_eq!(
            sink.unit("output_dir/sample_table_set.test").unwrap(),
            "header: SampleTableSet\n\
             table header: sample_table_1\n\
             table contents: sample_table_1\n\
             table footer: sample_table_1\n\
             \n\
             table header: sample_table_2\n\
             table contents: sample_table_2\n\
             table footer: sample_table_2\n\
             footer: SampleTableSet\n"
        );
    }

    #[test]
    fn unit_per_table() {
        let mut sink = MemorySink::default();
        render(&TraceRenderer::new(), Some(&sample_table_set()), true, Path::new("output_dir"), &mut sink).unwrap();

        assert_eq!(sink.units.len(), 2);
        for name in ["sample_table_1", "sample_table_2"] {
            assert_eq!(
                sink.unit(format!("output_dir/{name}.test")).unwrap(),
                format!(
                    "header: SampleTableSet\n\
                     table header: {name}\n\
                     table contents: {name}\n\
                     table footer: {name}\n\
                     footer: SampleTableSet\n"
                )
            );
        }
    }

    #[test]
    fn split_bodies_concatenate_to_single_body() {
        let table_set = sample_table_set();
        let mut single = MemorySink::default();
        render(&BareRenderer, Some(&table_set), false, Path::new("out"), &mut single).unwrap();
        let mut split = MemorySink::default();
        render(&BareRenderer, Some(&table_set), true, Path::new("out"), &mut split).unwrap();

        let joined: Vec<String> = table_set
            .tables
            .iter()
            .map(|table| split.unit(format!("out/{}.txt", table.name)).unwrap())
            .collect();
        assert_eq!(single.unit("out/sample_table_set.txt").unwrap(), joined.join("\n"));
    }

    #[test]
    fn empty_table_set_still_writes_hooks() {
        let mut sink = MemorySink::default();
        let table_set = TableSet::new("empty", vec![]);
        render(&TraceRenderer::new(), Some(&table_set), false, Path::new("out"), &mut sink).unwrap();
        assert_eq!(sink.unit("out/empty.test").unwrap(), "header: empty\nfooter: empty\n");

        let mut sink = MemorySink::default();
        render(&TraceRenderer::new(), Some(&table_set), true, Path::new("out"), &mut sink).unwrap();
        assert!(sink.units.is_empty());
    }

    #[test]
    fn nil_table_set() {
        let mut sink = MemorySink::default();
        let error = render(&TraceRenderer::new(), None, false, Path::new("out"), &mut sink).unwrap_err();
        assert!(matches!(error, TableDefError::RenderError(RenderError::NilInput)));
        assert_eq!(error.to_string(), "Table set is nil");
        assert!(sink.units.is_empty());
    }

    #[test]
    fn sink_failure_aborts_single_unit() {
        let mut sink = FailingSink {
            inner: MemorySink::default(),
            fail_on: PathBuf::from("output_dir/error.test"),
        };
        let table_set = TableSet::new("error", vec![Table::new("sample_table_1")]);
        let error = render(&TraceRenderer::new(), Some(&table_set), false, Path::new("output_dir"), &mut sink).unwrap_err();
        assert_eq!(error.to_string(), "error");
        assert!(sink.inner.units.is_empty());
    }

    #[test]
    fn sink_failure_keeps_written_units() {
        let mut sink = FailingSink {
            inner: MemorySink::default(),
            fail_on: PathBuf::from("output_dir/error.test"),
        };
        let table_set = TableSet::new(
            "sample_table_set",
            vec![Table::new("sample_table_1"), Table::new("error"), Table::new("sample_table_3")],
        );
        let result = render(&TraceRenderer::new(), Some(&table_set), true, Path::new("output_dir"), &mut sink);
        assert!(matches!(result, Err(TableDefError::IoError(_))));
        let written: Vec<&PathBuf> = sink.inner.units.keys().collect();
        assert_eq!(written, vec![&PathBuf::from("output_dir/sample_table_1.test")]);
    }

    #[test]
    fn render_table_tolerates_absent_inputs() {
        let table = Table::new("users");
        let renderer = BareRenderer;
        let mut buffer = Vec::new();

        render_table(None, Some(&table), &mut buffer).unwrap();
        render_table(Some(&renderer), None, &mut buffer).unwrap();
        assert!(buffer.is_empty());

        render_table(Some(&renderer), Some(&table), &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "users\n");
    }

    #[test]
    fn file_sink_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let table_set = TableSet::new("Shop", vec![Table::new("Orders")]);
        render(&BareRenderer, Some(&table_set), false, &out, &mut FileSink).unwrap();
        assert_eq!(fs::read_to_string(out.join("shop.txt")).unwrap(), "Orders\n");
    }
}
