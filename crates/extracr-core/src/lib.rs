//! Core library for turning scanned documents into structured data.
//!
//! This crate provides:
//! - Image preprocessing and text recognition (PaddleOCR models via `pure-onnx-ocr`)
//! - Generic field extraction (key/value lines, emails, phone numbers)
//! - Two-period balance sheet parsing with OCR misread correction
//! - A SQLite document store with additive field merges

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod store;

pub use error::{ExtracrError, ExtractionError, IngestError, OcrError, Result, StoreError};
pub use extract::rules::{clean_number, extract_fields, parse_balance_sheet, BalanceSheetParser, LabelNormalizer};
pub use extract::{DocumentParser, ParseResult};
pub use models::{BalanceSheetRow, BalanceSheetTable, ExtracrConfig, FieldMap, FieldValue, RawDocument};
pub use ocr::{ImagePreprocessor, OcrResult, TextBox, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{BatchReport, IngestPipeline, IngestedDocument};
pub use store::{DocumentSelector, DocumentStore, SqliteStore};
