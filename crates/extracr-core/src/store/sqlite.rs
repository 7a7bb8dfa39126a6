//! SQLite-backed document store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{DocumentSelector, DocumentStore};
use crate::error::StoreError;
use crate::models::document::{FieldMap, RawDocument};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ocr_documents (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    filename    TEXT NOT NULL,
    raw_text    TEXT NOT NULL,
    fields      TEXT,
    created_at  TEXT NOT NULL
);
";

const SELECT_COLUMNS: &str = "SELECT id, filename, raw_text, fields, created_at FROM ocr_documents";

/// Row as read from the database, before decoding the JSON and timestamp.
type StoredRow = (i64, String, String, Option<String>, String);

/// Document store in a single SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let unavailable = |reason: String| StoreError::Unavailable {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
        let store = Self::with_connection(conn).map_err(|e| unavailable(e.to_string()))?;

        info!("Opened document store at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Unavailable {
            path: PathBuf::from(":memory:"),
            reason: e.to_string(),
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteStore {
    fn insert(&mut self, filename: &str, raw_text: &str, fields: &FieldMap) -> Result<i64, StoreError> {
        let fields_json = serde_json::to_string(fields)?;
        self.conn.execute(
            "INSERT INTO ocr_documents (filename, raw_text, fields, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![filename, raw_text, fields_json, Utc::now().to_rfc3339()],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted document {} ({})", id, filename);
        Ok(id)
    }

    fn fetch(&self, selector: DocumentSelector) -> Result<Option<RawDocument>, StoreError> {
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<StoredRow> {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        };

        let stored = match selector {
            DocumentSelector::Id(id) => self
                .conn
                .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], map_row)
                .optional()?,
            DocumentSelector::Latest => self
                .conn
                .query_row(&format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT 1"), [], map_row)
                .optional()?,
        };

        stored.map(decode_row).transpose()
    }

    fn merge_fields(&mut self, id: i64, partial: Map<String, Value>) -> Result<(), StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<Option<String>> = tx
            .query_row(
                "SELECT fields FROM ocr_documents WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let existing = existing.ok_or(StoreError::NotFound(id))?;

        let mut fields = decode_fields(id, existing.as_deref())?;
        let keys: Vec<String> = partial.keys().cloned().collect();
        fields.extend(partial);

        tx.execute(
            "UPDATE ocr_documents SET fields = ?1 WHERE id = ?2",
            params![serde_json::to_string(&fields)?, id],
        )?;
        tx.commit()?;

        debug!("Merged keys {:?} into document {}", keys, id);
        Ok(())
    }
}

fn decode_row((id, filename, raw_text, fields, created_at): StoredRow) -> Result<RawDocument, StoreError> {
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| StoreError::InvalidRecord {
            id,
            reason: format!("created_at {created_at:?}: {e}"),
        })?
        .with_timezone(&Utc);

    Ok(RawDocument {
        id,
        filename,
        raw_text,
        fields: decode_fields(id, fields.as_deref())?,
        created_at,
    })
}

/// A missing payload is an empty object; anything that is not an object is
/// rejected.
fn decode_fields(id: i64, raw: Option<&str>) -> Result<Map<String, Value>, StoreError> {
    match raw {
        None => Ok(Map::new()),
        Some(raw) => match serde_json::from_str(raw)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(StoreError::InvalidRecord {
                id,
                reason: format!("fields is not an object: {other}"),
            }),
        },
    }
}
