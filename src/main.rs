use anyhow::Result;
use etf_flows::{cli, logging, Asset};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();
    cli::run(&Asset::ALL).await
}
