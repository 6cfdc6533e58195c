// src/process/table.rs

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, trace};

use super::date_parser::parse_flow_date;
use super::utils::{clean_str, header_key};
use super::RawTable;
use crate::error::{FlowError, Result};

/// Share of body cells that must parse as dates for a headerless date column.
const DATE_COLUMN_RATIO: f64 = 0.6;
const MAX_SPAN: usize = 64;

/// Find the daily flow table in `html` and return its raw cells.
///
/// Every `<table>` is a candidate. A candidate needs a date column (header
/// `Date`, or mostly date-like cells); among those the one with the most body
/// rows wins, then the one with the most other columns.
#[instrument(level = "debug", skip(html), fields(bytes = html.len()))]
pub fn parse_flow_table(html: &str) -> Result<RawTable> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("table selector should parse");

    let mut best: Option<RawTable> = None;
    let mut scanned = 0usize;

    for table in document.select(&table_sel) {
        scanned += 1;
        let Some(candidate) = read_table(table) else {
            trace!(index = scanned, "table has no date column");
            continue;
        };
        debug!(
            index = scanned,
            rows = candidate.rows.len(),
            cols = candidate.headers.len(),
            "candidate table"
        );
        let better = match &best {
            None => true,
            Some(b) => score(&candidate) > score(b),
        };
        if better {
            best = Some(candidate);
        }
    }

    best.ok_or_else(|| {
        FlowError::Parse(format!(
            "no table with a date column found ({} tables scanned); the page layout may have changed",
            scanned
        ))
    })
}

fn score(t: &RawTable) -> (usize, usize) {
    (t.rows.len(), t.headers.len().saturating_sub(1))
}

/// Split one `<table>` into header and body rows and locate its date column.
fn read_table(table: ElementRef<'_>) -> Option<RawTable> {
    let tr_sel = Selector::parse("tr").expect("tr selector should parse");

    // rows belonging to nested tables are skipped
    let rows: Vec<ElementRef<'_>> = table
        .select(&tr_sel)
        .filter(|tr| owning_table(*tr).map(|t| t.id()) == Some(table.id()))
        .collect();
    if rows.is_empty() {
        return None;
    }

    let in_thead: Vec<bool> = rows.iter().map(|tr| parent_is(*tr, "thead")).collect();
    let header_len = if in_thead.iter().any(|b| *b) {
        in_thead.iter().take_while(|b| **b).count()
    } else {
        let leading_th = rows.iter().take_while(|tr| is_header_row(**tr)).count();
        leading_th.max(1)
    };

    let grid = expand_spans(&rows);
    let (head, body) = grid.split_at(header_len.min(grid.len()));
    // thead rows that are not leading still count as headers
    let body: Vec<Vec<String>> = body
        .iter()
        .zip(in_thead.iter().skip(head.len()))
        .filter(|(_, thead)| !**thead)
        .map(|(r, _)| r.clone())
        .filter(|r| r.iter().any(|c| !c.is_empty()))
        .collect();

    let headers = join_headers(head);
    let date_col = find_date_col(&headers, &body)?;

    Some(RawTable {
        headers,
        rows: body,
        date_col,
    })
}

fn owning_table(tr: ElementRef<'_>) -> Option<ElementRef<'_>> {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
}

fn parent_is(el: ElementRef<'_>, name: &str) -> bool {
    el.parent()
        .and_then(ElementRef::wrap)
        .map(|p| p.value().name() == name)
        .unwrap_or(false)
}

fn row_cells(tr: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| matches!(e.value().name(), "td" | "th"))
}

fn is_header_row(tr: ElementRef<'_>) -> bool {
    let mut cells = row_cells(tr).peekable();
    cells.peek().is_some() && cells.all(|c| c.value().name() == "th")
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

/// Lay rows out on a grid, repeating text across `colspan` and `rowspan`.
fn expand_spans(rows: &[ElementRef<'_>]) -> Vec<Vec<String>> {
    // per column: (text, rows still covered below the current one)
    let mut carry: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for tr in rows {
        let mut out: Vec<String> = Vec::new();
        let mut cells = row_cells(*tr);

        loop {
            let col = out.len();
            if let Some(Some((text, left))) = carry.get_mut(col) {
                out.push(text.clone());
                *left -= 1;
                if *left == 0 {
                    carry[col] = None;
                }
                continue;
            }
            let Some(cell) = cells.next() else {
                // trailing rowspans past the last real cell
                if carry.iter().skip(col).any(Option::is_some) {
                    out.push(String::new());
                    continue;
                }
                break;
            };

            let text = clean_str(&cell.text().collect::<String>());
            let colspan = span_attr(cell, "colspan");
            let rowspan = span_attr(cell, "rowspan");
            for _ in 0..colspan {
                let c = out.len();
                if rowspan > 1 {
                    if carry.len() <= c {
                        carry.resize(c + 1, None);
                    }
                    carry[c] = Some((text.clone(), rowspan - 1));
                }
                out.push(text.clone());
            }
        }
        while out.last().map(|c| c.is_empty()).unwrap_or(false) && out.len() > 1 {
            out.pop();
        }
        grid.push(out);
    }
    grid
}

/// One name per column: the non-empty texts of every header row joined with a
/// space, skipping a repeat of the text directly above.
fn join_headers(head: &[Vec<String>]) -> Vec<String> {
    let width = head.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|col| {
            let mut parts: Vec<&str> = Vec::new();
            for row in head {
                let text = row.get(col).map(String::as_str).unwrap_or("");
                if !text.is_empty() && parts.last() != Some(&text) {
                    parts.push(text);
                }
            }
            parts.join(" ")
        })
        .collect()
}

fn find_date_col(headers: &[String], body: &[Vec<String>]) -> Option<usize> {
    if let Some(i) = headers.iter().position(|h| header_key(h) == "date") {
        return Some(i);
    }
    if body.is_empty() {
        return None;
    }

    let width = body.iter().map(Vec::len).max().unwrap_or(0);
    let mut best: Option<(usize, f64)> = None;
    for col in 0..width {
        let hits = body
            .iter()
            .filter(|r| r.get(col).and_then(|c| parse_flow_date(c)).is_some())
            .count();
        let ratio = hits as f64 / body.len() as f64;
        if best.map(|(_, r)| ratio > r).unwrap_or(true) {
            best = Some((col, ratio));
        }
    }
    best.filter(|(_, r)| *r > DATE_COLUMN_RATIO).map(|(c, _)| c)
}
