// src/write.rs

use chrono::NaiveDate;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::asset::Asset;
use crate::error::{FlowError, Result};
use crate::process::FlowViews;

const DATE_FMT: &str = "%Y-%m-%d";

/// Rendered CSV bytes for the three views of one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPayloads {
    pub wide: Vec<u8>,
    pub long: Vec<u8>,
    pub totals: Vec<u8>,
}

fn fmt_date(d: NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

/// Shortest round-trip decimal; `-0` is written as `0`.
fn fmt_number(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        v.to_string()
    }
}

fn fmt_value(v: Option<f64>) -> String {
    v.map(fmt_number).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner()
        .map_err(|e| FlowError::Csv(e.into_error().into()))
}

/// `date,<issuer>...`, one row per date.
pub fn render_wide(views: &FlowViews) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = Vec::with_capacity(views.issuers.len() + 1);
    header.push("date".to_string());
    header.extend(views.issuers.iter().cloned());
    wtr.write_record(&header)?;

    for row in &views.wide {
        let mut rec = Vec::with_capacity(row.values.len() + 1);
        rec.push(fmt_date(row.date));
        rec.extend(row.values.iter().map(|v| fmt_value(*v)));
        wtr.write_record(&rec)?;
    }
    finish(wtr)
}

/// `date,issuer,value`, nulls as empty fields.
pub fn render_long(views: &FlowViews) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["date", "issuer", "value"])?;
    for rec in &views.long {
        wtr.write_record([
            fmt_date(rec.date),
            rec.issuer.clone(),
            fmt_value(rec.flow_value),
        ])?;
    }
    finish(wtr)
}

/// `date,total,cumulative`.
pub fn render_totals(views: &FlowViews) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["date", "total", "cumulative"])?;
    for t in &views.totals {
        wtr.write_record([
            fmt_date(t.date),
            fmt_number(t.total_value),
            fmt_number(t.cumulative),
        ])?;
    }
    finish(wtr)
}

pub fn render(views: &FlowViews) -> Result<CsvPayloads> {
    Ok(CsvPayloads {
        wide: render_wide(views)?,
        long: render_long(views)?,
        totals: render_totals(views)?,
    })
}

/// Write `bytes` to `path` via a sibling temp file, replacing any old file.
fn write_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));
    fs::write(&tmp_path, bytes).map_err(|e| FlowError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| FlowError::io(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Render all three views, then write them into `out_dir`.
/// Returns the written paths in wide, long, totals order.
pub fn write_views(asset: Asset, views: &FlowViews, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let payloads = render(views)?;

    fs::create_dir_all(out_dir).map_err(|e| FlowError::io(out_dir, e))?;

    let outputs = [
        (asset.wide_file_name(), &payloads.wide),
        (asset.long_file_name(), &payloads.long),
        (asset.totals_file_name(), &payloads.totals),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, bytes) in outputs {
        let path = out_dir.join(name);
        write_replace(&path, bytes)?;
        written.push(path);
    }
    info!(%asset, dir = %out_dir.display(), "wrote CSVs");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{DailyTotal, FlowRecord, WideRow};
    use anyhow::Result;
    use tempfile::tempdir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn views() -> FlowViews {
        let d1 = ymd(2024, 1, 1);
        FlowViews {
            issuers: vec!["IBIT".into(), "Grayscale, GBTC".into()],
            wide: vec![WideRow {
                date: d1,
                values: vec![Some(-12.3), None],
            }],
            long: vec![
                FlowRecord {
                    date: d1,
                    issuer: "IBIT".into(),
                    flow_value: Some(-12.3),
                },
                FlowRecord {
                    date: d1,
                    issuer: "Grayscale, GBTC".into(),
                    flow_value: None,
                },
            ],
            totals: vec![DailyTotal {
                date: d1,
                total_value: -0.0,
                cumulative: 100.0,
            }],
        }
    }

    #[test]
    fn test_render_shapes() -> Result<()> {
        let p = render(&views())?;
        assert_eq!(
            String::from_utf8(p.wide)?,
            "date,IBIT,\"Grayscale, GBTC\"\n2024-01-01,-12.3,\n"
        );
        assert_eq!(
            String::from_utf8(p.long)?,
            "date,issuer,value\n2024-01-01,IBIT,-12.3\n2024-01-01,\"Grayscale, GBTC\",\n"
        );
        assert_eq!(
            String::from_utf8(p.totals)?,
            "date,total,cumulative\n2024-01-01,0,100\n"
        );
        Ok(())
    }

    #[test]
    fn test_write_views_creates_dir_and_overwrites() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("nested").join("Data");
        let stale = "old contents that are much longer than the new file\n".repeat(10);
        fs::create_dir_all(&out)?;
        fs::write(out.join("bitcoin_etf_totals_daily.csv"), stale)?;

        let paths = write_views(Asset::Bitcoin, &views(), &out)?;
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("bitcoin_etf_flows_wide_daily.csv"));
        assert_eq!(
            fs::read_to_string(out.join("bitcoin_etf_totals_daily.csv"))?,
            "date,total,cumulative\n2024-01-01,0,100\n"
        );

        // no temp files left behind
        let names: Vec<String> = fs::read_dir(&out)?
            .map(|e| e.map(|e| e.file_name().to_string_lossy().to_string()))
            .collect::<std::io::Result<_>>()?;
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
        assert_eq!(names.len(), 3);
        Ok(())
    }
}
