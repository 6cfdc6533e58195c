// src/pipeline.rs

use chrono::NaiveDate;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use url::Url;

use crate::asset::Asset;
use crate::config::Config;
use crate::error::{FlowError, Result};
use crate::fetch::fetch_html;
use crate::process::{clean_table, parse_flow_table, reshape, validate_footer, FlowViews};
use crate::publish::copy_outputs;
use crate::write::write_views;

/// Outcome of one asset run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub asset: Asset,
    pub dates: usize,
    pub issuers: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub written: Vec<PathBuf>,
    pub published: Vec<PathBuf>,
}

/// Parse, clean and reshape a fetched page. Touches nothing outside memory.
pub fn build_views(html: &str, fill_calendar_gaps: bool) -> Result<FlowViews> {
    let raw = parse_flow_table(html)?;
    let table = clean_table(&raw)?;
    if let Some(mismatch) = validate_footer(&table) {
        warn!("{}", mismatch);
    }
    Ok(reshape(&table, fill_calendar_gaps))
}

/// Write the views and, when configured, copy them into the docs directory.
pub fn emit(asset: Asset, views: &FlowViews, cfg: &Config) -> Result<RunSummary> {
    let written = write_views(asset, views, &cfg.out_dir)?;
    let published = match &cfg.docs_dir {
        Some(docs) => copy_outputs(&written, docs)?,
        None => Vec::new(),
    };

    Ok(RunSummary {
        asset,
        dates: views.wide.len(),
        issuers: views.issuers.len(),
        first_date: views.first_date(),
        last_date: views.last_date(),
        written,
        published,
    })
}

/// Full run for one asset: fetch, parse, clean, reshape, write.
/// Nothing is written unless fetch and parse both succeed.
#[instrument(level = "info", skip_all, fields(asset = %asset))]
pub async fn run_asset(client: &Client, asset: Asset, cfg: &Config) -> Result<RunSummary> {
    let url = Url::parse(asset.url())
        .map_err(|e| FlowError::Config(format!("bad URL {}: {}", asset.url(), e)))?;
    let html = fetch_html(client, &url).await?;
    let views = build_views(&html, cfg.fill_calendar_gaps)?;
    let summary = emit(asset, &views, cfg)?;

    info!(
        dates = summary.dates,
        issuers = summary.issuers,
        first = ?summary.first_date,
        last = ?summary.last_date,
        "asset done"
    );
    Ok(summary)
}
