//! Structured data extraction from recognized text.

mod parser;
pub mod rules;

pub use parser::{DocumentParser, ParseResult};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
