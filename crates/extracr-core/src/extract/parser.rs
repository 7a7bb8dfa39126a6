//! Document parser combining field extraction and balance sheet parsing.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::models::config::BalanceSheetConfig;
use crate::models::document::{BalanceSheetTable, FieldMap};

use super::rules::{extract_fields, BalanceSheetParser};
use super::Result;

/// Result of parsing one document's text.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// Generic key/value and contact fields.
    pub fields: FieldMap,
    /// Balance sheet table, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_sheet: Option<BalanceSheetTable>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Runs the text parsers over recognized text.
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    balance_sheet: BalanceSheetParser,
}

impl DocumentParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BalanceSheetConfig) -> Result<Self> {
        Ok(Self {
            balance_sheet: BalanceSheetParser::from_config(config)?,
        })
    }

    pub fn with_balance_sheet_parser(mut self, parser: BalanceSheetParser) -> Self {
        self.balance_sheet = parser;
        self
    }

    /// Extract the flat field map.
    pub fn fields(&self, text: &str) -> FieldMap {
        extract_fields(text)
    }

    /// Extract the balance sheet table.
    pub fn balance_sheet(&self, text: &str) -> BalanceSheetTable {
        self.balance_sheet.parse(text)
    }

    /// Run the field extractor and, optionally, the balance sheet parser.
    pub fn parse(&self, text: &str, with_balance_sheet: bool) -> ParseResult {
        let start = Instant::now();

        let fields = self.fields(text);
        let balance_sheet = with_balance_sheet.then(|| self.balance_sheet(text));

        let processing_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Parsed {} fields{} in {}ms",
            fields.len(),
            balance_sheet
                .as_ref()
                .map(|t| format!(" and {} balance sheet rows", t.len()))
                .unwrap_or_default(),
            processing_time_ms
        );

        ParseResult {
            fields,
            balance_sheet,
            processing_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statement_document() {
        let text = "\
Company: Example Holdings Ltd
Email: finance@example.com
Inventories 15,773 12,400
Total assets 1,458,687 1,404,150";

        let parser = DocumentParser::new();
        let result = parser.parse(text, true);

        assert_eq!(result.fields.get_text("company"), Some("Example Holdings Ltd"));
        assert_eq!(
            result.fields.get_list("emails").unwrap(),
            &["finance@example.com".to_string()][..]
        );

        let table = result.balance_sheet.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.row("inventories").unwrap().prior, Some(12400));
    }

    #[test]
    fn test_balance_sheet_optional() {
        let result = DocumentParser::new().parse("Inventories 1 2", false);
        assert!(result.balance_sheet.is_none());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("balance_sheet").is_none());
    }

    #[test]
    fn test_configured_periods() {
        let config = BalanceSheetConfig {
            periods: ["2024".to_string(), "2023".to_string()],
        };
        let table = DocumentParser::from_config(&config)
            .unwrap()
            .balance_sheet("Inventories 1 2");
        assert_eq!(table.periods, ["2024", "2023"]);
    }
}
