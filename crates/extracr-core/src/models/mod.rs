//! Data models and configuration.

pub mod config;
pub mod document;

pub use config::ExtracrConfig;
pub use document::{BalanceSheetRow, BalanceSheetTable, FieldMap, FieldValue, RawDocument};
