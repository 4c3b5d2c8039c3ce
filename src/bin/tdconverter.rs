//! tdconverter - converts spreadsheet table definitions to SQL and Go structs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabledef::config::{Config, CONFIG_FILE};
use tabledef::render::{render, FileSink, GoRenderer, Renderer, SqlRenderer};
use tabledef::spreadsheet::{self, Criteria};
use tracing::{debug, info};

/// Name of the worksheet holding the common columns
const COMMON_SHEET: &str = "common";

#[derive(Parser)]
#[command(name = "tdconverter")]
#[command(version)]
#[command(about = "Converts the table definitions to SQL and Go struct etc.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Alias or path of the table definitions workbook
    #[arg(short = 'i', long, global = true)]
    workbook: Option<String>,

    /// Sheet name (glob) of the table definitions. If not specified, all sheets in the workbook
    #[arg(short = 'n', long, global = true)]
    sheetname: Option<String>,

    /// Alias or path of the workbook whose 'common' sheet holds the common columns
    #[arg(short = 'c', long, global = true)]
    common: Option<String>,

    /// Output one file per table
    #[arg(short = 'm', long, global = true)]
    multi: bool,

    /// Output directory [default: ./out/<command>]
    #[arg(short = 'o', long, global = true)]
    out: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, env = "TDCONVERTER_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Converts the table definitions to SQL
    Sql,
    /// Converts the table definitions to Go struct
    Go,
    /// Validates and shows the configuration file
    Conf,
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::Sql => convert(&cli, &SqlRenderer::new(), "sql"),
        Command::Go => convert(&cli, &GoRenderer::new(), "go"),
        Command::Conf => show_config(&cli.config),
    }
}

fn resolve(config: Option<&Config>, name: &str) -> Result<PathBuf> {
    match config {
        Some(config) => Ok(config.resolve(name)?),
        None => Ok(PathBuf::from(name)),
    }
}

fn convert(cli: &Cli, renderer: &dyn Renderer, command: &str) -> Result<()> {
    let Some(workbook_name) = cli.workbook.as_deref() else {
        bail!("Global option 'workbook' is required");
    };

    let config = Config::load(&cli.config)?;
    let layout = config.as_ref().map(|config| config.layout.clone()).unwrap_or_default();
    let mut parser = layout
        .parser_builder()
        .and_then(|builder| builder.build())
        .context("Unable to create new parser")?;

    if let Some(common) = cli.common.as_deref() {
        let path = resolve(config.as_ref(), common)?;
        let mut workbook = spreadsheet::open(&path).context("Unable to open common workbook")?;
        let sheet = workbook
            .read_sheet(COMMON_SHEET)
            .context("Unable to get common sheet values")?;
        parser
            .set_common_columns(&sheet)
            .context("Unable to parse common sheet information")?;
    }

    let path = resolve(config.as_ref(), workbook_name)?;
    let criteria = match cli.sheetname.as_deref() {
        Some(pattern) => Criteria::matching(pattern)?,
        None => Criteria::all(),
    };
    let mut workbook = spreadsheet::open(&path)
        .with_context(|| format!("Unable to open workbook '{}'", path.display()))?;
    let sheets = workbook.read_sheets(&criteria).context("Unable to get sheet values")?;
    if sheets.is_empty() {
        bail!("No sheet matches in workbook '{}'", path.display());
    }
    debug!(sheets = sheets.len(), workbook = %path.display(), "read definition sheets");

    let name = config
        .as_ref()
        .and_then(|config| config.entry(workbook_name))
        .map(|entry| entry.name.to_owned())
        .or_else(|| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_else(|| workbook_name.to_owned());
    let table_set = parser.parse_sheets(&name, &sheets)?;

    let out = cli
        .out
        .clone()
        .unwrap_or_else(|| Path::new("./out").join(command));
    render(renderer, Some(&table_set), cli.multi, &out, &mut FileSink)
        .context("Fail to output table definitions")?;
    info!(tables = table_set.tables.len(), out = %out.display(), "converted");

    println!("complete!");
    Ok(())
}

fn show_config(path: &Path) -> Result<()> {
    let Some(config) = Config::load(path)? else {
        println!("There is no configuration file ({}).", path.display());
        return Ok(());
    };

    let header = ["Name", "Alias", "Path"];
    let rows: Vec<[String; 3]> = config
        .sheets
        .iter()
        .map(|sheet| [sheet.name.to_owned(), sheet.alias.to_owned(), sheet.path.display().to_string()])
        .collect();
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 3]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        println!("  {}", padded.join(" | ").trim_end());
    };
    line(header);
    let separator = widths.map(|width| "-".repeat(width));
    println!("  {}", separator.join("-+-"));
    for row in &rows {
        line([row[0].as_str(), row[1].as_str(), row[2].as_str()]);
    }
    Ok(())
}
