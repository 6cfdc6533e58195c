// src/process/reshape.rs

use chrono::NaiveDate;

use super::clean::{CleanRow, CleanTable};

/// Absolute difference (in the table's units) tolerated by `validate_footer`.
const FOOTER_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub date: NaiveDate,
    pub issuer: String,
    pub flow_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_value: f64,
    /// Running sum of `total_value` up to and including this date.
    pub cumulative: f64,
}

/// The three output shapes of one cleaned table.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowViews {
    pub issuers: Vec<String>,
    pub wide: Vec<WideRow>,
    pub long: Vec<FlowRecord>,
    pub totals: Vec<DailyTotal>,
}

impl FlowViews {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.wide.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.wide.last().map(|r| r.date)
    }
}

/// Build wide, long and totals views. Long keeps nulls as explicit records.
pub fn reshape(table: &CleanTable, fill_calendar_gaps: bool) -> FlowViews {
    let filled;
    let rows: &[CleanRow] = if fill_calendar_gaps {
        filled = fill_gaps(&table.rows, table.issuers.len());
        &filled
    } else {
        &table.rows
    };

    let wide = rows
        .iter()
        .map(|r| WideRow {
            date: r.date,
            values: r.values.clone(),
        })
        .collect();

    let long = rows
        .iter()
        .flat_map(|r| {
            table
                .issuers
                .iter()
                .zip(r.values.iter())
                .map(move |(issuer, v)| FlowRecord {
                    date: r.date,
                    issuer: issuer.clone(),
                    flow_value: *v,
                })
        })
        .collect();

    let mut running = 0.0;
    let totals = rows
        .iter()
        .map(|r| {
            running += r.total;
            DailyTotal {
                date: r.date,
                total_value: r.total,
                cumulative: round6(running),
            }
        })
        .collect();

    FlowViews {
        issuers: table.issuers.clone(),
        wide,
        long,
        totals,
    }
}

/// Insert a row for every missing calendar day: null flows, zero total.
/// `rows` must be sorted by date.
pub fn fill_gaps(rows: &[CleanRow], issuers: usize) -> Vec<CleanRow> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(prev) = out.last().map(|r: &CleanRow| r.date) {
            let mut day = prev.succ_opt();
            while let Some(d) = day.filter(|d| *d < row.date) {
                out.push(CleanRow {
                    date: d,
                    values: vec![None; issuers],
                    total: 0.0,
                });
                day = d.succ_opt();
            }
        }
        out.push(row.clone());
    }
    out
}

/// Compare the footer "Total" row against the sum of the daily totals.
/// Returns a description of the mismatch, if any.
pub fn validate_footer(table: &CleanTable) -> Option<String> {
    let footer = table.footer_total?;
    let sum: f64 = table.rows.iter().map(|r| r.total).sum();
    if (footer - sum).abs() > FOOTER_TOLERANCE {
        Some(format!(
            "footer total {} differs from sum of daily totals {}",
            footer,
            round6(sum)
        ))
    } else {
        None
    }
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}
