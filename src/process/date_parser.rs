use chrono::NaiveDate;

use super::utils::clean_str;

/// Day-first layouts seen on the flow pages, most common first.
const DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
];

/// Parse a table date cell such as `"11 Jan 2024"` or `"2024-01-11"`.
pub fn parse_flow_date(s: &str) -> Option<NaiveDate> {
    let s = clean_str(s);
    if s.is_empty() || !s.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
}
