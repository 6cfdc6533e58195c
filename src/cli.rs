// src/cli.rs

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use crate::{fetch, pipeline, Asset, Config};

/// Run each asset in turn. A failing asset does not stop the next one, but
/// makes the whole invocation fail.
pub async fn run(assets: &[Asset]) -> Result<()> {
    // ─── 1) config + client ─────────────────────────────────────────
    let cfg = Config::load().context("loading config")?;
    info!(out_dir = %cfg.out_dir.display(), docs_dir = ?cfg.docs_dir, "startup");
    let client = fetch::build_client(&cfg)?;

    // ─── 2) one pipeline per asset ──────────────────────────────────
    let mut failed = Vec::new();
    for &asset in assets {
        match pipeline::run_asset(&client, asset, &cfg).await {
            Ok(summary) => {
                for path in summary.written.iter().chain(&summary.published) {
                    info!(%asset, "wrote {}", path.display());
                }
            }
            Err(e) if e.is_source_failure() => {
                error!(%asset, error = %e, "source unavailable or layout changed; no files written");
                failed.push(asset.slug());
            }
            Err(e) => {
                error!(%asset, error = %e, "run failed");
                failed.push(asset.slug());
            }
        }
    }

    if !failed.is_empty() {
        bail!("failed assets: {}", failed.join(", "));
    }
    info!("all done");
    Ok(())
}
