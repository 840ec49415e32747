//! Remote archive retrieval through the configured CORS proxy.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;

use crate::models::AppRequest;

const USER_AGENT: &str = concat!("appcache-packer/", env!("CARGO_PKG_VERSION"));

/// Source of raw bytes addressed by URL.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
  /// Retrieve the body at `url`, failing on any non-2xx status.
  async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`ArchiveFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
  client: Client,
}

impl HttpFetcher {
  /// Create a fetcher with a fresh HTTP client.
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
  async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
    let response = self
      .client
      .get(url)
      .header("User-Agent", USER_AGENT)
      .send()
      .await
      .with_context(|| format!("failed to request {url}"))?;

    let status = response.status();
    if !status.is_success() {
      bail!("Bad status: {} for {url}", status.as_u16());
    }

    let body = response
      .bytes()
      .await
      .with_context(|| format!("failed to read response body from {url}"))?;
    tracing::debug!(url, bytes = body.len(), "Fetched remote content");
    Ok(body.to_vec())
  }
}

/// Build the GitHub archive download URL for a request.
pub fn archive_download_url(github_base: &str, request: &AppRequest) -> String {
  let file_name = format!("{}.zip", request.branch);
  [
    github_base.trim_end_matches('/'),
    request.owner.as_str(),
    request.repo.as_str(),
    "archive",
    file_name.as_str(),
  ]
  .join("/")
}

/// Prefix `url` with the proxy base. An empty proxy leaves the URL untouched.
pub fn proxied_url(proxy: &str, url: &str) -> String {
  let proxy = proxy.trim().trim_end_matches('/');
  if proxy.is_empty() {
    return url.to_string();
  }
  format!("{proxy}/{url}")
}
