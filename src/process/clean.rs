// src/process/clean.rs

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::cell::Cell;
use super::date_parser::parse_flow_date;
use super::utils::header_key;
use super::RawTable;
use crate::error::{FlowError, Result};

/// Columns that sit next to the issuers but are not issuers themselves.
const NON_ISSUER_COLUMNS: &[&str] = &[
    "total",
    "btc",
    "eth",
    "average",
    "maximum",
    "minimum",
    "cumulative",
];

/// Body rows whose first cell is one of these are summaries or repeated headers.
const SUMMARY_LABELS: &[&str] = &["date", "average", "maximum", "minimum"];

#[derive(Debug, Clone, PartialEq)]
pub struct CleanRow {
    pub date: NaiveDate,
    /// One entry per issuer, in issuer order.
    pub values: Vec<Option<f64>>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable {
    pub issuers: Vec<String>,
    /// Sorted by date, one row per date.
    pub rows: Vec<CleanRow>,
    /// The table's own total column was present.
    pub total_from_source: bool,
    /// Total cell of the footer "Total" row.
    pub footer_total: Option<f64>,
    /// Rows dropped for a bad or duplicate date.
    pub dropped: usize,
}

struct Columns {
    issuers: Vec<(usize, String)>,
    total: Option<usize>,
}

fn classify_columns(raw: &RawTable) -> Columns {
    let mut issuers = Vec::new();
    let mut total = None;

    for (i, name) in raw.headers.iter().enumerate() {
        if i == raw.date_col {
            continue;
        }
        let key = header_key(name);
        if key == "total" && total.is_none() {
            total = Some(i);
        } else if key.is_empty() {
            debug!(column = i, "skipping column without a header");
        } else if NON_ISSUER_COLUMNS.contains(&key.as_str()) {
            debug!(column = %name, "skipping non-issuer column");
        } else {
            issuers.push((i, name.clone()));
        }
    }

    Columns { issuers, total }
}

/// Turn raw cells into dated rows.
///
/// Rows with a date that does not parse are dropped with a warning, except the
/// known summary labels which are dropped quietly. The `Total` footer row is
/// kept aside as `footer_total`.
pub fn clean_table(raw: &RawTable) -> Result<CleanTable> {
    let cols = classify_columns(raw);
    if cols.issuers.is_empty() {
        return Err(FlowError::Parse(format!(
            "flow table has no issuer columns (headers: {:?})",
            raw.headers
        )));
    }
    if cols.total.is_none() {
        warn!("no Total column in source table; summing issuer values instead");
    }

    let mut rows: Vec<CleanRow> = Vec::with_capacity(raw.rows.len());
    let mut seen: HashSet<NaiveDate> = HashSet::new();
    let mut footer_total = None;
    let mut dropped = 0usize;

    for r in 0..raw.rows.len() {
        let date_text = raw.cell(r, raw.date_col);

        let Some(date) = parse_flow_date(date_text) else {
            let label = header_key(date_text);
            if label == "total" {
                footer_total = cols
                    .total
                    .and_then(|c| Cell::parse(raw.cell(r, c)).as_option());
            } else if label.is_empty() || SUMMARY_LABELS.contains(&label.as_str()) {
                debug!(row = r, label = %date_text, "skipping summary row");
            } else {
                warn!(row = r, date = %date_text, "dropping row with unparseable date");
                dropped += 1;
            }
            continue;
        };

        if !seen.insert(date) {
            warn!(row = r, %date, "dropping duplicate date");
            dropped += 1;
            continue;
        }

        let values: Vec<Option<f64>> = cols
            .issuers
            .iter()
            .map(|(c, issuer)| cell_value(raw.cell(r, *c), date, issuer))
            .collect();

        let total = match cols.total {
            Some(c) => match Cell::parse(raw.cell(r, c)) {
                Cell::Number(v) => v,
                Cell::Null => 0.0,
                Cell::Unparseable(text) => {
                    warn!(%date, cell = %text, "unparseable total; using 0");
                    0.0
                }
            },
            None => values.iter().flatten().sum(),
        };

        rows.push(CleanRow {
            date,
            values,
            total,
        });
    }

    if rows.is_empty() {
        return Err(FlowError::Parse(
            "flow table contains no rows with a valid date".to_string(),
        ));
    }

    rows.sort_by_key(|r| r.date);
    info!(
        rows = rows.len(),
        issuers = cols.issuers.len(),
        dropped,
        "cleaned flow table"
    );

    Ok(CleanTable {
        issuers: cols.issuers.into_iter().map(|(_, name)| name).collect(),
        rows,
        total_from_source: cols.total.is_some(),
        footer_total,
        dropped,
    })
}

fn cell_value(text: &str, date: NaiveDate, issuer: &str) -> Option<f64> {
    match Cell::parse(text) {
        Cell::Number(v) => Some(v),
        Cell::Null => None,
        Cell::Unparseable(text) => {
            warn!(%date, issuer, cell = %text, "unparseable flow value; treating as null");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use anyhow::Result;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            date_col: 0,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clean_basic_rows() -> Result<()> {
        init_test_logging();
        let t = raw(
            &["Date", "IBIT", "FBTC", "Total"],
            &[
                &["11 Jan 2024", "111.7", "(1.5)", "110.2"],
                &["12 Jan 2024", "-", "1,024.0", "1,024.0"],
                &["Total", "111.7", "1,022.5", "1,134.2"],
                &["Average", "55.9", "511.3", "567.1"],
            ],
        );
        let c = clean_table(&t)?;
        assert_eq!(c.issuers, vec!["IBIT", "FBTC"]);
        assert_eq!(c.rows.len(), 2);
        assert_eq!(c.rows[0].values, vec![Some(111.7), Some(-1.5)]);
        assert_eq!(c.rows[1].values, vec![None, Some(1024.0)]);
        assert_eq!(c.rows[1].total, 1024.0);
        assert_eq!(c.footer_total, Some(1134.2));
        assert!(c.total_from_source);
        assert_eq!(c.dropped, 0);
        Ok(())
    }

    #[test]
    fn test_total_is_taken_not_summed() -> Result<()> {
        let t = raw(
            &["Date", "A", "B", "Total"],
            &[&["2024-01-01", "1.0", "2.0", "10.0"]],
        );
        let c = clean_table(&t)?;
        assert_eq!(c.rows[0].total, 10.0);
        Ok(())
    }

    #[test]
    fn test_missing_total_column_sums() -> Result<()> {
        let t = raw(
            &["Date", "A", "B"],
            &[&["2024-01-01", "1.5", "-"], &["2024-01-02", "(1)", "2"]],
        );
        let c = clean_table(&t)?;
        assert!(!c.total_from_source);
        assert_eq!(c.rows[0].total, 1.5);
        assert_eq!(c.rows[1].total, 1.0);
        Ok(())
    }

    #[test]
    fn test_malformed_date_dropped_others_kept() -> Result<()> {
        init_test_logging();
        let t = raw(
            &["Date", "A", "Total"],
            &[
                &["2024-01-01", "1", "1"],
                &["2024-02-30", "2", "2"],
                &["Jan the third", "3", "3"],
                &["2024-01-04", "4", "4"],
            ],
        );
        let c = clean_table(&t)?;
        let dates: Vec<_> = c.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![ymd(2024, 1, 1), ymd(2024, 1, 4)]);
        assert_eq!(c.dropped, 2);
        Ok(())
    }

    #[test]
    fn test_repeated_header_and_duplicates_and_sorting() -> Result<()> {
        let t = raw(
            &["Date", "A", "Total"],
            &[
                &["2024-01-02", "2", "2"],
                &["Date", "A", "Total"],
                &["2024-01-01", "1", "1"],
                &["2024-01-02", "9", "9"],
            ],
        );
        let c = clean_table(&t)?;
        assert_eq!(c.rows.len(), 2);
        assert_eq!(c.rows[0].date, ymd(2024, 1, 1));
        assert_eq!(c.rows[1].values, vec![Some(2.0)]);
        assert_eq!(c.dropped, 1);
        Ok(())
    }

    #[test]
    fn test_non_issuer_and_blank_columns_skipped() -> Result<()> {
        let t = raw(
            &["Date", "IBIT", "", "BTC", "Total"],
            &[&["2024-01-01", "1", "x", "7", "1"]],
        );
        let c = clean_table(&t)?;
        assert_eq!(c.issuers, vec!["IBIT"]);
        Ok(())
    }

    #[test]
    fn test_unparseable_cells_become_null() -> Result<()> {
        let t = raw(
            &["Date", "A", "Total"],
            &[&["2024-01-01", "n/a", "-"], &["2024-01-02", "3"]],
        );
        let c = clean_table(&t)?;
        assert_eq!(c.rows[0].values, vec![None]);
        assert_eq!(c.rows[0].total, 0.0);
        // short row: missing total cell reads as blank
        assert_eq!(c.rows[1].total, 0.0);
        Ok(())
    }

    #[test]
    fn test_no_dated_rows_is_parse_error() {
        let t = raw(&["Date", "A", "Total"], &[&["Total", "1", "1"]]);
        assert!(matches!(clean_table(&t), Err(FlowError::Parse(_))));

        let t = raw(&["Date", "Total"], &[&["2024-01-01", "1"]]);
        assert!(matches!(clean_table(&t), Err(FlowError::Parse(_))));
    }
}
