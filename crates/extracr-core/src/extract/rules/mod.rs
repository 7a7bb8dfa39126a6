//! Rule-based extractors for recognized document text.

pub mod balance_sheet;
pub mod fields;
pub mod labels;
pub mod numbers;
pub mod patterns;

pub use balance_sheet::{parse_balance_sheet, BalanceSheetParser};
pub use fields::{
    extract_fields, normalize_key, EmailExtractor, KeyValue, KeyValueExtractor, PhoneExtractor,
};
pub use labels::{CanonicalLabelSet, CorrectionRule, LabelNormalizer};
pub use numbers::clean_number;
pub use patterns::split_lines;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
