//! Common regex patterns for field and balance sheet extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // `label: value` or `label = value`, one per line
    pub static ref KEY_VALUE: Regex = Regex::new(
        r"(?m)^\s*([A-Za-z0-9 _\-/.]+)\s*[:=]\s*(.+?)\s*$"
    ).unwrap();

    pub static ref KEY_INVALID_CHARS: Regex = Regex::new(
        r"[^a-z0-9_]+"
    ).unwrap();

    // Email pattern
    pub static ref EMAIL: Regex = Regex::new(
        r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}"
    ).unwrap();

    // Phone pattern (optional country code, optional area code, 3-4 + 4 digits)
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+?\d{1,3}[\s\-.]?)?(?:\(?\d{2,4}\)?[\s\-.]?)?\d{3,4}[\s\-.]?\d{4}"
    ).unwrap();

    // Numeric token in a balance sheet line (sign, digits, separators)
    pub static ref NUMBER_TOKEN: Regex = Regex::new(
        r"[-+]?\d[\d,.\-]*"
    ).unwrap();

    pub static ref TRAILING_NUMBER: Regex = Regex::new(
        r"[-+]?\d[\d,.\-]*\s*$"
    ).unwrap();

    // Section headers never carry a row of their own
    pub static ref SECTION_HEADER: Regex = Regex::new(
        r"(?i)^\s*(assets|equity|liabilities|notes|net assets value)"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();

    // Line boundaries: CRLF, LF, lone CR, VT, FF, FS/GS/RS, NEL and the
    // Unicode line and paragraph separators
    pub static ref LINE_BREAK: Regex = Regex::new(
        r"\r\n|[\n\r\x0B\x0C\x1C-\x1E\x{85}\x{2028}\x{2029}]"
    ).unwrap();
}

/// Split text into lines on every line boundary in [`LINE_BREAK`].
///
/// A trailing boundary does not produce a final empty line, and empty text
/// has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = LINE_BREAK.split(text).collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}
