//! Error types for the extracr-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the extracr library.
#[derive(Error, Debug)]
pub enum ExtracrError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field or table extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Ingestion error for a single input.
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to image preprocessing and recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Image could not be read or decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to extraction rule tables.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A correction rule pattern did not compile.
    #[error("invalid rule pattern {pattern:?}: {reason}")]
    InvalidRule { pattern: String, reason: String },

    /// Period identifiers that cannot serve as distinct row keys.
    #[error("invalid balance sheet periods {periods:?}: {reason}")]
    InvalidPeriods { periods: [String; 2], reason: String },
}

/// Errors raised by the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be opened or initialized.
    #[error("store unavailable at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    /// A query failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored payload could not be encoded or decoded.
    #[error("invalid fields payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row does not have the expected shape.
    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: i64, reason: String },

    /// No document with the given id.
    #[error("document {0} not found")]
    NotFound(i64),
}

/// Per-item ingestion failures. None of these abort a batch.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The image could not be decoded.
    #[error("could not read image {path}: {reason}")]
    InputUnreadable { path: PathBuf, reason: String },

    /// Recognition produced no text.
    #[error("no text detected in {path}")]
    NoTextDetected { path: PathBuf },

    /// The recognition engine failed on this item.
    #[error("recognition failed for {path}: {source}")]
    Recognition {
        path: PathBuf,
        #[source]
        source: OcrError,
    },

    /// Inserting the record failed.
    #[error("could not store {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

impl IngestError {
    /// Path of the input that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::InputUnreadable { path, .. }
            | Self::NoTextDetected { path }
            | Self::Recognition { path, .. }
            | Self::Store { path, .. } => path,
        }
    }
}

/// Result type for the extracr library.
pub type Result<T> = std::result::Result<T, ExtracrError>;
