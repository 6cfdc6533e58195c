// src/process/cell.rs

use super::utils::clean_str;

/// A non-date table cell after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    /// Blank or a dash placeholder: no figure published.
    Null,
    /// Anything else; carries the cleaned text for diagnostics.
    Unparseable(String),
}

const NULL_TOKENS: &[&str] = &["", "-", "\u{2013}", "\u{2014}"];

impl Cell {
    /// Parse a raw scraped cell.
    ///
    /// Thousands separators and inner spaces are dropped, accounting
    /// negatives `(12.3)` become `-12.3`, and the unicode minus sign is
    /// accepted. Non-finite spellings such as `inf` or `NaN` are rejected.
    pub fn parse(raw: &str) -> Cell {
        let text = clean_str(raw);
        let compact: String = text
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .map(|c| if c == '\u{2212}' { '-' } else { c })
            .collect();

        if NULL_TOKENS.contains(&compact.as_str()) {
            return Cell::Null;
        }

        let (negate, digits) = match compact
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
        {
            Some(inner) => (true, inner),
            None => (false, compact.as_str()),
        };

        if !digits.bytes().any(|b| b.is_ascii_digit()) {
            return Cell::Unparseable(text);
        }

        match digits.parse::<f64>() {
            Ok(v) if v.is_finite() && !(negate && digits.starts_with(['-', '+'])) => {
                Cell::Number(if negate { -v } else { v })
            }
            _ => Cell::Unparseable(text),
        }
    }

    pub fn as_option(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Null | Cell::Unparseable(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthesized_negative() {
        assert_eq!(Cell::parse("(12.3)"), Cell::Number(-12.3));
        assert_eq!(Cell::parse("(1,024.5)"), Cell::Number(-1024.5));
    }

    #[test]
    fn test_dash_is_null_not_zero() {
        assert_eq!(Cell::parse("-"), Cell::Null);
        assert_eq!(Cell::parse("\u{2013}"), Cell::Null);
        assert_eq!(Cell::parse("\u{2014}"), Cell::Null);
        assert_eq!(Cell::parse("  "), Cell::Null);
        assert_eq!(Cell::parse("0.0"), Cell::Number(0.0));
    }

    #[test]
    fn test_separators_and_minus_forms() {
        assert_eq!(Cell::parse("1,234.5"), Cell::Number(1234.5));
        assert_eq!(Cell::parse("1\u{a0}234"), Cell::Number(1234.0));
        assert_eq!(Cell::parse("\u{2212}7.5"), Cell::Number(-7.5));
        assert_eq!(Cell::parse("-7.5"), Cell::Number(-7.5));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(Cell::parse("n/a"), Cell::Unparseable("n/a".to_string()));
        assert_eq!(Cell::parse("inf"), Cell::Unparseable("inf".to_string()));
        assert_eq!(
            Cell::parse("0.25%"),
            Cell::Unparseable("0.25%".to_string())
        );
        assert_eq!(Cell::parse("(-3)"), Cell::Unparseable("(-3)".to_string()));
        assert_eq!(Cell::parse("n/a").as_option(), None);
    }
}
