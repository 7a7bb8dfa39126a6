//! Two-period balance sheet row extraction.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::labels::LabelNormalizer;
use super::numbers::clean_number;
use super::patterns::{split_lines, NUMBER_TOKEN, SECTION_HEADER, TRAILING_NUMBER};
use crate::extract::Result;
use crate::models::config::{validate_periods, BalanceSheetConfig};
use crate::models::document::{BalanceSheetRow, BalanceSheetTable};

/// Parses recognized statement text into labeled rows with a current and a
/// prior period value.
#[derive(Debug, Clone)]
pub struct BalanceSheetParser {
    normalizer: LabelNormalizer,
    periods: [String; 2],
}

impl BalanceSheetParser {
    /// Create a parser with the built-in label tables and default periods.
    pub fn new() -> Self {
        Self::with_normalizer(LabelNormalizer::default())
    }

    pub fn with_normalizer(normalizer: LabelNormalizer) -> Self {
        Self {
            normalizer,
            periods: BalanceSheetConfig::default().periods,
        }
    }

    pub fn from_config(config: &BalanceSheetConfig) -> Result<Self> {
        Self::new().with_periods(config.periods.clone())
    }

    /// Set the period identifiers, most recent first. Empty, equal or
    /// `label` identifiers are rejected.
    pub fn with_periods(mut self, periods: [String; 2]) -> Result<Self> {
        validate_periods(&periods)?;
        self.periods = periods;
        Ok(self)
    }

    pub fn periods(&self) -> &[String; 2] {
        &self.periods
    }

    /// Parse one line into a row. Section headers, lines with fewer than two
    /// numbers, empty labels and rows with no parseable value yield `None`.
    pub fn parse_line(&self, line: &str) -> Option<BalanceSheetRow> {
        let line = line.trim();
        if line.is_empty() || SECTION_HEADER.is_match(line) {
            return None;
        }

        let tokens: Vec<&str> = NUMBER_TOKEN.find_iter(line).map(|m| m.as_str()).collect();
        if tokens.len() < 2 {
            return None;
        }
        let current = clean_number(tokens[tokens.len() - 2]);
        let prior = clean_number(tokens[tokens.len() - 1]);

        let remainder = TRAILING_NUMBER.replace(line, "");
        let remainder = TRAILING_NUMBER.replace(&remainder, "");
        let label = self.normalizer.normalize(&remainder);

        if label.is_empty() || (current.is_none() && prior.is_none()) {
            trace!("Discarding line {:?}", line);
            return None;
        }

        Some(BalanceSheetRow {
            label,
            current,
            prior,
        })
    }

    /// Parse a whole document. The first row for each label is kept and rows
    /// stay in source order.
    pub fn parse(&self, text: &str) -> BalanceSheetTable {
        let mut table = BalanceSheetTable::new(self.periods.clone());
        let mut seen = HashSet::new();

        for row in split_lines(text).into_iter().filter_map(|line| self.parse_line(line)) {
            if !seen.insert(row.label.clone()) {
                debug!("Skipping duplicate balance sheet label {:?}", row.label);
                continue;
            }
            table.rows.push(row);
        }

        debug!("Parsed {} balance sheet rows", table.rows.len());
        table
    }
}

impl Default for BalanceSheetParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a balance sheet with the default tables and periods.
pub fn parse_balance_sheet(text: &str) -> BalanceSheetTable {
    BalanceSheetParser::new().parse(text)
}
