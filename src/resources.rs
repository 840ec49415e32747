//! Loading of the bundled resources injected into every packed site.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use futures_util::future::try_join_all;
use regex::Regex;

use crate::fetch::ArchiveFetcher;
use crate::models::{LoadedResource, ResourceEntry};

fn remote_base_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)^https?://").expect("invalid http(s) regex"))
}

/// Whether the asset base should be fetched over HTTP instead of read from disk.
pub fn is_remote_base(base: &str) -> bool {
  remote_base_pattern().is_match(base)
}

/// Load every resource concurrently, preserving the order of `entries`.
///
/// Fails as soon as any single resource cannot be read.
pub async fn load_resources(
  base: &str,
  entries: &[ResourceEntry],
  fetcher: &dyn ArchiveFetcher,
) -> Result<Vec<LoadedResource>> {
  let loads = entries
    .iter()
    .map(|entry| load_resource(base, entry, fetcher));
  let resources = try_join_all(loads).await?;
  tracing::debug!(count = resources.len(), base, "Loaded bundled resources");
  Ok(resources)
}

async fn load_resource(
  base: &str,
  entry: &ResourceEntry,
  fetcher: &dyn ArchiveFetcher,
) -> Result<LoadedResource> {
  let bytes = if is_remote_base(base) {
    let url = format!(
      "{}/{}",
      base.trim_end_matches('/'),
      entry.source.trim_start_matches('/')
    );
    fetcher
      .fetch(&url)
      .await
      .with_context(|| format!("failed to fetch resource {}", entry.source))?
  } else {
    let path = Path::new(base).join(&entry.source);
    tokio::fs::read(&path)
      .await
      .with_context(|| format!("failed to read resource {}", path.display()))?
  };

  Ok(LoadedResource {
    target: entry.target.clone(),
    bytes,
  })
}
