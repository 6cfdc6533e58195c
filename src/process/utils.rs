use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Trim, fold NBSP / thin space into plain spaces and collapse whitespace runs.
pub fn clean_str(raw: &str) -> String {
    let replaced = raw.replace(['\u{a0}', '\u{2009}', '\u{202f}'], " ");
    WHITESPACE_RUN
        .replace_all(replaced.trim(), " ")
        .trim()
        .to_string()
}

/// Lowercased, cleaned header used for column matching.
pub fn header_key(raw: &str) -> String {
    clean_str(raw).to_lowercase()
}
