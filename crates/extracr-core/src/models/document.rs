//! Document data models: stored documents, field maps and balance sheet tables.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::extract::rules::split_lines;

/// Key under which balance sheet tables are merged into a document's fields.
pub const BALANCE_SHEET_KEY: &str = "balance_sheet";

/// Row key holding the caption; period identifiers supply the other keys.
pub const ROW_LABEL_KEY: &str = "label";

/// A recognized document as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// Store-assigned identifier.
    pub id: i64,

    /// Source file name (without directory).
    pub filename: String,

    /// Recognized text, one line per row of the source image.
    pub raw_text: String,

    /// Structured-fields payload (field map plus any merged tables).
    pub fields: Map<String, Value>,

    /// Time the document was inserted.
    pub created_at: DateTime<Utc>,
}

impl RawDocument {
    /// The recognized lines, split on every line boundary.
    pub fn lines(&self) -> Vec<&str> {
        split_lines(&self.raw_text)
    }
}

/// Value stored under a field key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single text value.
    Text(String),
    /// Multi-valued field (emails, phones).
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

/// Flat mapping from normalized keys to extracted values.
///
/// Inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single text value.
    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), FieldValue::Text(value.into()));
    }

    /// Set a multi-valued entry.
    pub fn insert_list(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.0.insert(key.into(), FieldValue::List(values));
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(FieldValue::as_list)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

/// One labeled balance sheet line with a value per period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSheetRow {
    /// Canonical caption or cleaned free text.
    pub label: String,
    /// Most recent period value.
    pub current: Option<i64>,
    /// Prior period value.
    pub prior: Option<i64>,
}

/// Two-period balance sheet extracted from recognized text.
///
/// Serializes as `{"table_years": [a, b], "rows": [{"label": .., a: .., b: ..}]}`
/// so the period identifiers double as row keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSheetTable {
    /// Period identifiers, most recent first.
    pub periods: [String; 2],
    /// Rows in first-appearance order.
    pub rows: Vec<BalanceSheetRow>,
}

impl BalanceSheetTable {
    pub fn new(periods: [String; 2]) -> Self {
        Self {
            periods,
            rows: Vec::new(),
        }
    }

    /// Look up a row by its label.
    pub fn row(&self, label: &str) -> Option<&BalanceSheetRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct RowView<'a> {
    row: &'a BalanceSheetRow,
    periods: &'a [String; 2],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(ROW_LABEL_KEY, &self.row.label)?;
        map.serialize_entry(&self.periods[0], &self.row.current)?;
        map.serialize_entry(&self.periods[1], &self.row.prior)?;
        map.end()
    }
}

impl Serialize for BalanceSheetTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowView<'_>> = self
            .rows
            .iter()
            .map(|row| RowView {
                row,
                periods: &self.periods,
            })
            .collect();

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("table_years", &self.periods)?;
        map.serialize_entry("rows", &rows)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_field_map_serializes_flat() {
        let mut fields = FieldMap::new();
        fields.insert_text("invoice_no", "12345");
        fields.insert_list("emails", vec!["a@b.com".to_string()]);

        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value, json!({"invoice_no": "12345", "emails": ["a@b.com"]}));

        let back: FieldMap = serde_json::from_value(value).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn test_field_map_last_insert_wins() {
        let mut fields = FieldMap::new();
        fields.insert_text("total", "1");
        fields.insert_text("total", "2");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get_text("total"), Some("2"));
        assert_eq!(fields.get_list("total"), None);
    }

    #[test]
    fn test_balance_sheet_serialization() {
        let mut table = BalanceSheetTable::new(["2022".to_string(), "2021".to_string()]);
        table.rows.push(BalanceSheetRow {
            label: "inventories".to_string(),
            current: Some(15773),
            prior: None,
        });

        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(
            value,
            json!({
                "table_years": ["2022", "2021"],
                "rows": [{"label": "inventories", "2022": 15773, "2021": null}]
            })
        );
    }

    #[test]
    fn test_raw_document_lines() {
        let doc = RawDocument {
            id: 1,
            filename: "scan.png".to_string(),
            raw_text: "Inventories 1 2\rTotal assets 3 4\x0cShare capital 5 6\n".to_string(),
            fields: Map::new(),
            created_at: Utc::now(),
        };
        assert_eq!(
            doc.lines(),
            vec!["Inventories 1 2", "Total assets 3 4", "Share capital 5 6"]
        );
    }

    #[test]
    fn test_empty_table_is_well_formed() {
        let table = BalanceSheetTable::new(["a".to_string(), "b".to_string()]);
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value, json!({"table_years": ["a", "b"], "rows": []}));
        assert!(table.row("anything").is_none());
    }
}
