// src/fetch.rs

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{FlowError, Result};

/// Build the shared HTTP client: browser User-Agent, cookies, configured timeout.
pub fn build_client(cfg: &Config) -> Result<Client> {
    Client::builder()
        .user_agent(cfg.user_agent.clone())
        .cookie_store(true)
        .gzip(true)
        .timeout(cfg.timeout())
        .build()
        .map_err(|e| FlowError::Config(format!("building HTTP client: {}", e)))
}

/// One GET, no retries. Any transport error or non-2xx status is fatal.
#[instrument(level = "info", skip_all, fields(url = %url))]
pub async fn fetch_html(client: &Client, url: &Url) -> Result<String> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| FlowError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FlowError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.text().await.map_err(|source| FlowError::Fetch {
        url: url.to_string(),
        source,
    })?;
    debug!(bytes = body.len(), "fetched page");
    Ok(body)
}
