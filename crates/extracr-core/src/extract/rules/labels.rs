//! Balance sheet label cleaning: OCR misread correction and canonical captions.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::WHITESPACE_RUN;
use crate::error::ExtractionError;
use crate::extract::Result;

/// Characters trimmed from both ends of a label.
const TRIM_CHARS: &[char] = &[' ', ':', '\t', '-', '\u{2013}', '\u{2014}', '_', '.'];

/// Known OCR misreads in financial statement captions, applied in order.
pub const DEFAULT_CORRECTIONS: &[(&str, &str)] = &[
    (r"\bequny\b", "equity"),
    (r"\bbabies\b", "liabilities"),
    (r"\babies\b", "liabilities"),
    (r"\babities\b", "liabilities"),
    (r"\bbenetis\b", "benefits"),
    (r"\bcavent\b", "current"),
    (r"\bnon[\s\-]*cunent\b", "non current"),
    (r"\bnon[\s\-]*conent\b", "non current"),
    (r"\bprepaymens\b", "prepayments"),
    (r"\bdeposis\b", "deposits"),
    (r"\btra[ \-]*de\b", "trade"),
    (r"\bgenera reserve ?/ ?tetained ening\b", "general reserve/retained earnings"),
    (r"\brou ?asset\b", "right-of-use (rou) asset"),
];

/// Statement of financial position captions. Order matters: the first caption
/// contained in a cleaned label wins.
pub const DEFAULT_CANONICAL_LABELS: &[&str] = &[
    "property, plant and equipment",
    "intangible assets",
    "right-of-use (rou) asset",
    "advances, deposits and prepayments",
    "non-current assets",
    "inventories",
    "trade and other receivables",
    "cash and cash equivalents",
    "current assets",
    "total assets",
    "share capital",
    "other component of equity",
    "general reserve/retained earnings",
    "equity attributable to owners of the company",
    "non-controlling interest",
    "total equity",
    "employee benefits-non current portion",
    "deferred tax liabilities",
    "lease liability-non current portion",
    "other non-current liabilities",
    "non-current liabilities",
    "lease liabilities-current portion",
    "employee benefits-current portion",
    "trade and other payables",
    "provision for expenses",
    "current tax liabilities",
    "unclaimed dividend",
    "current liabilities",
    "total liabilities",
    "total equity and liabilities",
    "net assets value (nav) per share",
];

lazy_static! {
    static ref DEFAULT_RULES: Vec<CorrectionRule> = DEFAULT_CORRECTIONS
        .iter()
        .map(|(pattern, replacement)| CorrectionRule {
            pattern: Regex::new(pattern).unwrap(),
            replacement: (*replacement).to_string(),
        })
        .collect();
}

/// A single regex substitution for a known misread.
#[derive(Debug, Clone)]
pub struct CorrectionRule {
    pattern: Regex,
    replacement: String,
}

impl CorrectionRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| ExtractionError::InvalidRule {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
        })
    }

    /// Replace every match in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, regex::NoExpand(&self.replacement))
            .into_owned()
    }
}

/// Ordered set of canonical captions matched by substring containment.
#[derive(Debug, Clone)]
pub struct CanonicalLabelSet {
    labels: Vec<String>,
}

impl CanonicalLabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// First caption, in declaration order, contained in `text`.
    pub fn resolve(&self, text: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|label| text.contains(label.as_str()))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for CanonicalLabelSet {
    fn default() -> Self {
        Self::new(DEFAULT_CANONICAL_LABELS.iter().copied())
    }
}

/// Cleans a line fragment into a label, correcting misreads and snapping to a
/// canonical caption when one is contained in the result.
#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    corrections: Vec<CorrectionRule>,
    canonical: CanonicalLabelSet,
}

impl LabelNormalizer {
    pub fn new(corrections: Vec<CorrectionRule>, canonical: CanonicalLabelSet) -> Self {
        Self {
            corrections,
            canonical,
        }
    }

    /// Build correction rules from `(pattern, replacement)` pairs.
    pub fn from_tables(
        corrections: &[(&str, &str)],
        canonical: CanonicalLabelSet,
    ) -> Result<Self> {
        let corrections = corrections
            .iter()
            .map(|(pattern, replacement)| CorrectionRule::new(pattern, *replacement))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(corrections, canonical))
    }

    /// Lowercase, trim, collapse whitespace and apply the correction rules.
    /// Does not snap to canonical captions.
    pub fn correct(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let mut label = WHITESPACE_RUN
            .replace_all(lowered.trim_matches(TRIM_CHARS), " ")
            .into_owned();

        for rule in &self.corrections {
            label = rule.apply(&label);
        }

        label.trim_matches(TRIM_CHARS).to_string()
    }

    /// Clean `text` and return its canonical caption, or the cleaned text when
    /// no caption matches. Empty input gives an empty label.
    pub fn normalize(&self, text: &str) -> String {
        let label = self.correct(text);
        match self.canonical.resolve(&label) {
            Some(canonical) => canonical.to_string(),
            None => label,
        }
    }

    pub fn canonical_labels(&self) -> &CanonicalLabelSet {
        &self.canonical
    }
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.clone(), CanonicalLabelSet::default())
    }
}
