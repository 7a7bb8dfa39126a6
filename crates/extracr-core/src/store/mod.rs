//! Persistence of recognized documents and their structured fields.

mod sqlite;

pub use sqlite::SqliteStore;

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::models::document::{BalanceSheetTable, FieldMap, RawDocument, BALANCE_SHEET_KEY};

/// Which document to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSelector {
    /// A specific document id.
    Id(i64),
    /// The most recently inserted document.
    Latest,
}

impl From<Option<i64>> for DocumentSelector {
    fn from(id: Option<i64>) -> Self {
        id.map(Self::Id).unwrap_or(Self::Latest)
    }
}

/// A store of recognized documents.
pub trait DocumentStore {
    /// Insert a new document and return its id.
    fn insert(&mut self, filename: &str, raw_text: &str, fields: &FieldMap) -> Result<i64, StoreError>;

    /// Fetch a document, or `None` when it does not exist.
    fn fetch(&self, selector: DocumentSelector) -> Result<Option<RawDocument>, StoreError>;

    /// Merge the given top-level keys into a document's fields, leaving all
    /// other keys untouched.
    fn merge_fields(&mut self, id: i64, partial: Map<String, Value>) -> Result<(), StoreError>;

    /// Merge a balance sheet table under the `balance_sheet` key.
    fn merge_balance_sheet(&mut self, id: i64, table: &BalanceSheetTable) -> Result<(), StoreError> {
        let mut partial = Map::new();
        partial.insert(BALANCE_SHEET_KEY.to_string(), serde_json::to_value(table)?);
        self.merge_fields(id, partial)
    }
}
