//! Subcommand implementations.

pub mod balance_sheet;
pub mod config;
pub mod ingest;
pub mod parse;

use std::path::{Path, PathBuf};

use extracr_core::models::config::ExtracrConfig;
use extracr_core::BalanceSheetTable;

/// Output format for parsed data.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// CSV (balance sheet rows only)
    Csv,
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("extracr")
        .join("config.json")
}

/// Load configuration from the given path, the default path, or defaults, then
/// apply environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ExtracrConfig> {
    let config = match config_path {
        Some(path) => ExtracrConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                ExtracrConfig::from_file(&default_path)?
            } else {
                ExtracrConfig::default()
            }
        }
    };
    let config = config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Render a balance sheet as CSV: label then one column per period.
pub fn format_balance_sheet_csv(table: &BalanceSheetTable) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["label", table.periods[0].as_str(), table.periods[1].as_str()])?;

    for row in &table.rows {
        wtr.write_record([
            row.label.clone(),
            row.current.map(|v| v.to_string()).unwrap_or_default(),
            row.prior.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use extracr_core::BalanceSheetRow;

    #[test]
    fn test_balance_sheet_csv() {
        let mut table = BalanceSheetTable::new(["2022".to_string(), "2021".to_string()]);
        table.rows.push(BalanceSheetRow {
            label: "property, plant and equipment".to_string(),
            current: Some(1342700),
            prior: None,
        });

        let csv = format_balance_sheet_csv(&table).unwrap();
        assert_eq!(
            csv,
            "label,2022,2021\n\"property, plant and equipment\",1342700,\n"
        );
    }
}
