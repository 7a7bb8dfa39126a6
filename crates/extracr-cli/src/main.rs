//! CLI application for scanned document OCR and balance sheet extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{balance_sheet, config, ingest, parse};

/// Extracr - Turn scanned documents into structured data
#[derive(Parser)]
#[command(name = "extracr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize images and store their text and fields
    Ingest(ingest::IngestArgs),

    /// Parse a stored document as a balance sheet and merge the table
    BalanceSheet(balance_sheet::BalanceSheetArgs),

    /// Parse a plain text file without touching the store
    Parse(parse::ParseArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine
    dotenvy::dotenv().ok();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Ingest(args) => ingest::run(args, cli.config.as_deref()),
        Commands::BalanceSheet(args) => balance_sheet::run(args, cli.config.as_deref()),
        Commands::Parse(args) => parse::run(args, cli.config.as_deref()),
        Commands::Config(args) => config::run(args, cli.config.as_deref()),
    }
}
