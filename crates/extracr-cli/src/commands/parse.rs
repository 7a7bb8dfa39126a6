//! Parse command - run the text parsers over a plain text file.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use extracr_core::DocumentParser;

use super::{format_balance_sheet_csv, load_config, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file holding recognized text
    input: PathBuf,

    /// Also parse the text as a balance sheet
    #[arg(short, long)]
    balance_sheet: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let text = fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e))?;

    let parser = DocumentParser::from_config(&config.balance_sheet)?;

    match args.format {
        OutputFormat::Json => {
            let result = parser.parse(&text, args.balance_sheet);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Csv => {
            if !args.balance_sheet {
                anyhow::bail!("CSV output is only available with --balance-sheet");
            }
            let table = parser.balance_sheet(&text);
            print!("{}", format_balance_sheet_csv(&table)?);
        }
    }

    Ok(())
}
