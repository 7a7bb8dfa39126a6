//! Balance sheet command - parse a stored document and merge the table back.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use extracr_core::{DocumentParser, DocumentSelector, DocumentStore, SqliteStore, StoreError};

use super::{format_balance_sheet_csv, load_config, OutputFormat};

/// Arguments for the balance-sheet command.
#[derive(Args)]
pub struct BalanceSheetArgs {
    /// Document id (defaults to the most recent document)
    #[arg(long)]
    id: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Database file (overrides config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Print the table without writing it back
    #[arg(long)]
    dry_run: bool,
}

pub fn run(args: BalanceSheetArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(database) = args.database {
        config.store.database_path = database;
    }

    let mut store = SqliteStore::open(&config.store.database_path)?;

    let selector = DocumentSelector::from(args.id);
    let document = match (store.fetch(selector)?, selector) {
        (Some(document), _) => document,
        (None, DocumentSelector::Latest) => {
            println!("{} No documents found.", style("ℹ").blue());
            return Ok(());
        }
        (None, DocumentSelector::Id(id)) => return Err(StoreError::NotFound(id).into()),
    };

    info!(
        "Parsing document {} ({}, {} lines)",
        document.id,
        document.filename,
        document.lines().len()
    );

    let parser = DocumentParser::from_config(&config.balance_sheet)?;
    let table = parser.balance_sheet(&document.raw_text);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&table)?,
        OutputFormat::Csv => format_balance_sheet_csv(&table)?,
    };
    println!("{}", output.trim_end());

    if args.dry_run {
        eprintln!(
            "{} Dry run, document {} left unchanged.",
            style("ℹ").blue(),
            document.id
        );
        return Ok(());
    }

    store.merge_balance_sheet(document.id, &table)?;
    eprintln!(
        "{} Saved {} balance sheet rows to document {}",
        style("✓").green(),
        table.len(),
        document.id
    );

    Ok(())
}
