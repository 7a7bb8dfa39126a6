//! Numeric token cleaning for balance sheet values.

/// Convert a noisy OCR number such as `"1,342,700"`, `"3.900.07"` or `"15,773"`
/// to an integer.
///
/// Commas are always thousands separators. Periods are thousands separators
/// only when more than one remains; a single period is a decimal point and the
/// value is rounded half-to-even. Returns `None` for anything that does not
/// parse, including empty input.
pub fn clean_number(token: &str) -> Option<i64> {
    let mut cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if cleaned.contains(',') {
        cleaned.retain(|c| c != ',');
    }

    if cleaned.matches('.').count() > 1 {
        cleaned.retain(|c| c != '.');
    }

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let rounded = value.round_ties_even();
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }

    Some(rounded as i64)
}
