// src/process/mod.rs
pub mod cell;
pub mod clean;
pub mod date_parser;
pub mod reshape;
pub mod table;
pub mod utils;

pub use cell::Cell;
pub use clean::{clean_table, CleanRow, CleanTable};
pub use reshape::{reshape, validate_footer, DailyTotal, FlowRecord, FlowViews, WideRow};
pub use table::parse_flow_table;

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column names, one per grid column. Multi-row headers are already joined.
    pub headers: Vec<String>,
    /// Body rows in document order, whitespace-normalized. Rows may be
    /// shorter or longer than `headers`.
    pub rows: Vec<Vec<String>>,
    /// Index into `headers` of the column holding the row dates.
    pub date_col: usize,
}

impl RawTable {
    /// Cell at `(row, col)`, or `""` when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}
