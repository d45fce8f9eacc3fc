//! Profile-page fetching.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

/// Browser-like user agent sent with the page fetch.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/122.0 Safari/537.36";

/// Build the HTTP client shared by the page fetch and the notifiers.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Fetch the trader profile page as text. A non-success status is an error;
/// the caller decides whether the cycle survives it.
pub async fn fetch_profile_page(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?
        .error_for_status()
        .context("profile page returned error status")?;
    let body = resp
        .text()
        .await
        .context("failed to read profile page body")?;
    debug!("Fetched {} bytes from {url}", body.len());
    Ok(body)
}
