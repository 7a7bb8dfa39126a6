//! Generic key/value, email and phone extraction.

use super::FieldExtractor;
use super::patterns::{split_lines, EMAIL, KEY_INVALID_CHARS, KEY_VALUE, PHONE};
use crate::models::document::FieldMap;

/// Maximum length of a normalized field key.
pub const MAX_KEY_LEN: usize = 64;

/// Minimum number of digits for a phone candidate to be kept.
pub const MIN_PHONE_DIGITS: usize = 8;

/// A `label: value` pair with its label normalized to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Turn a free-text label into a `[a-z0-9_]` key of at most 64 characters.
pub fn normalize_key(label: &str) -> String {
    let key = label
        .trim()
        .to_lowercase()
        .replace([' ', '-', '/', '.'], "_");
    let mut key = KEY_INVALID_CHARS.replace_all(&key, "").into_owned();
    key.truncate(MAX_KEY_LEN);
    key
}

/// Extracts `label: value` and `label = value` lines.
pub struct KeyValueExtractor;

impl KeyValueExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeyValueExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for KeyValueExtractor {
    type Output = KeyValue;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        split_lines(text)
            .into_iter()
            .filter_map(|line| KEY_VALUE.captures(line))
            .filter_map(|caps| {
                let key = normalize_key(&caps[1]);
                if key.is_empty() {
                    return None;
                }
                Some(KeyValue {
                    key,
                    value: caps[2].trim().to_string(),
                })
            })
            .collect()
    }
}

/// Extracts distinct email addresses in first-seen order.
pub struct EmailExtractor;

impl EmailExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for EmailExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        EMAIL.find(text).map(|m| m.as_str().to_string())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        dedup_in_order(EMAIL.find_iter(text).map(|m| m.as_str().to_string()))
    }
}

/// Extracts distinct phone numbers with at least eight digits.
pub struct PhoneExtractor;

impl PhoneExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        dedup_in_order(
            PHONE
                .find_iter(text)
                .map(|m| m.as_str().trim().to_string())
                .filter(|p| p.chars().filter(|c| c.is_numeric()).count() >= MIN_PHONE_DIGITS),
        )
    }
}

fn dedup_in_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}

/// Build the field map for a document's recognized text.
///
/// Key/value lines are applied top to bottom so the last occurrence of a key
/// wins. `emails` and `phones` are added only when something was found and
/// replace any key/value entry of the same name.
pub fn extract_fields(text: &str) -> FieldMap {
    let mut fields = FieldMap::new();

    for kv in KeyValueExtractor::new().extract_all(text) {
        fields.insert_text(kv.key, kv.value);
    }

    let emails = EmailExtractor::new().extract_all(text);
    if !emails.is_empty() {
        fields.insert_list("emails", emails);
    }

    let phones = PhoneExtractor::new().extract_all(text);
    if !phones.is_empty() {
        fields.insert_list("phones", phones);
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Invoice No"), "invoice_no");
        assert_eq!(normalize_key(" Ref./Order-ID "), "ref__order_id");
        assert_eq!(normalize_key("Total (USD)"), "total_usd");
        assert_eq!(normalize_key("%%%"), "");
        assert_eq!(normalize_key(&"a".repeat(100)).len(), MAX_KEY_LEN);
    }

    #[test]
    fn test_key_value_lines() {
        let fields = extract_fields("Invoice No: 12345\nDate = 2024-01-15\n");
        assert_eq!(fields.get_text("invoice_no"), Some("12345"));
        assert_eq!(fields.get_text("date"), Some("2024-01-15"));
    }

    #[test]
    fn test_last_match_wins() {
        let fields = extract_fields("Invoice No: 12345\nsomething else\nInvoice No: 67890");
        assert_eq!(fields.get_text("invoice_no"), Some("67890"));
    }

    #[test]
    fn test_value_trimmed_and_label_spaced() {
        let fields = extract_fields("  Customer Name :   ACME Ltd.   ");
        assert_eq!(fields.get_text("customer_name"), Some("ACME Ltd."));
    }

    #[test]
    fn test_contact_entities() {
        let fields = extract_fields("Contact: a@b.com, +1 415-555-2671");

        assert_eq!(fields.get_list("emails"), Some(&["a@b.com".to_string()][..]));

        let phones = fields.get_list("phones").unwrap();
        assert!(!phones.is_empty());
        assert!(phones
            .iter()
            .any(|p| p.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_PHONE_DIGITS));
        assert_eq!(phones[0], "+1 415-555-2671");
    }

    #[test]
    fn test_entities_deduplicated() {
        let text = "x@y.org\nreply to x@y.org or z@y.org\ncall 415 555 2671\nagain 415 555 2671";
        let fields = extract_fields(text);
        assert_eq!(
            fields.get_list("emails").unwrap(),
            &["x@y.org".to_string(), "z@y.org".to_string()][..]
        );
        assert_eq!(fields.get_list("phones").unwrap().len(), 1);
    }

    #[test]
    fn test_eight_digit_run_is_a_phone() {
        let fields = extract_fields("Qty 1234 5678");
        assert_eq!(fields.get_list("phones"), Some(&["1234 5678".to_string()][..]));
    }

    #[test]
    fn test_short_numbers_are_not_phones() {
        let fields = extract_fields("Room 101, floor 3");
        assert!(fields.get("phones").is_none());
        assert!(fields.get("emails").is_none());
    }

    #[test]
    fn test_key_values_split_on_lone_carriage_return() {
        let fields = extract_fields("Invoice No: 12345\rTotal: 99");
        assert_eq!(fields.get_text("invoice_no"), Some("12345"));
        assert_eq!(fields.get_text("total"), Some("99"));
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_fields("").is_empty());
    }
}
