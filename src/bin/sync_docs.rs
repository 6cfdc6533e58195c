// Mirror the CSV output directory into the docs directory, removing stale files.
use anyhow::{anyhow, Context, Result};
use etf_flows::{logging, publish, Config};
use tracing::info;

fn main() -> Result<()> {
    logging::init();
    let cfg = Config::load().context("loading config")?;
    let docs = cfg
        .docs_dir
        .as_ref()
        .ok_or_else(|| anyhow!("docs_dir is disabled; nothing to sync"))?;

    let stats = publish::mirror_dir(&cfg.out_dir, docs).with_context(|| {
        format!(
            "mirroring {} -> {}",
            cfg.out_dir.display(),
            docs.display()
        )
    })?;
    info!(copied = stats.copied, removed = stats.removed, "synced");
    Ok(())
}
