//! Offline packing orchestrator: fetch, rewrite, inject and re-serialise a site archive.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};

use crate::archive::AppArchive;
use crate::config::PackerConfig;
use crate::delivery::download_file_name;
use crate::fetch::{ArchiveFetcher, archive_download_url, proxied_url};
use crate::html::rewrite_index;
use crate::manifest::generate_manifest;
use crate::models::{AppRequest, LoadedResource, PackedApp};
use crate::resources::load_resources;

/// Archive contents after all offline mutations, before delivery.
#[derive(Debug, Clone)]
pub struct ProcessedArchive {
  /// Folder prefix the site lives under, empty for flat archives.
  pub root: String,
  /// Generated cache manifest text.
  pub manifest: String,
  /// Serialized zip archive.
  pub bytes: Vec<u8>,
}

/// High-level helper turning a repository reference into an offline-capable archive.
pub struct OfflinePacker<F> {
  config: PackerConfig,
  fetcher: F,
}

impl<F: ArchiveFetcher> OfflinePacker<F> {
  /// Create a packer using `fetcher` for the archive and any remote resources.
  pub fn new(config: PackerConfig, fetcher: F) -> Self {
    Self { config, fetcher }
  }

  /// Download the repository archive and repackage it for offline use.
  pub async fn pack(&self, request: &AppRequest) -> Result<PackedApp> {
    let download_url = archive_download_url(&self.config.github_base, request);
    let url = proxied_url(&self.config.proxy, &download_url);
    tracing::info!(
      owner = %request.owner,
      repo = %request.repo,
      branch = %request.branch,
      %url,
      "Fetching repository archive"
    );

    let zip_bytes = self
      .fetcher
      .fetch(&url)
      .await
      .with_context(|| format!("failed to download {download_url}"))?;

    let processed = self.process_archive(&zip_bytes).await?;

    Ok(PackedApp {
      file_name: download_file_name(&request.branch),
      root: processed.root,
      manifest: processed.manifest,
      bytes: processed.bytes,
    })
  }

  /// Rewrite an already downloaded archive, loading the bundled resources first.
  pub async fn process_archive(&self, zip_bytes: &[u8]) -> Result<ProcessedArchive> {
    let archive = AppArchive::from_bytes(zip_bytes)?;
    let root = archive.locate_root(&self.config.index_html_file)?;
    tracing::debug!(root = %root, entries = archive.entries().len(), "Located site root");

    let resources = load_resources(
      &self.config.assets_base,
      &self.config.resources,
      &self.fetcher,
    )
    .await?;

    assemble(&self.config, archive, root, &resources, &Local::now())
  }
}

/// Apply every offline mutation to `archive` and serialise the result.
///
/// The manifest is generated last so it lists every file of the final archive, itself
/// included.
pub fn assemble<Tz>(
  config: &PackerConfig,
  mut archive: AppArchive,
  root: String,
  resources: &[LoadedResource],
  generated_at: &DateTime<Tz>,
) -> Result<ProcessedArchive>
where
  Tz: TimeZone,
  Tz::Offset: std::fmt::Display,
{
  let index_path = format!("{root}{}", config.index_html_file);
  let index_bytes = archive
    .file(&index_path)
    .with_context(|| format!("No {}", config.index_html_file))?;
  let index_text = match String::from_utf8(index_bytes.to_vec()) {
    Ok(text) => text,
    Err(err) => {
      tracing::warn!(path = %index_path, "Entry point is not valid UTF-8; decoding lossily");
      String::from_utf8_lossy(err.as_bytes()).into_owned()
    }
  };

  let rewritten = rewrite_index(&index_text, &config.manifest_name, &config.resources);
  archive.set_file(index_path, rewritten);

  for resource in resources {
    archive.set_file(format!("{root}{}", resource.target), resource.bytes.clone());
  }

  let mut cached = archive.file_paths_under(&root);
  if !cached.iter().any(|path| *path == config.manifest_name) {
    cached.push(config.manifest_name.clone());
  }
  let manifest = generate_manifest(&cached, generated_at);
  archive.set_file(format!("{root}{}", config.manifest_name), manifest.clone());

  let bytes = archive.to_bytes()?;
  tracing::info!(
    root = %root,
    files = cached.len(),
    bytes = bytes.len(),
    "Packed offline archive"
  );

  Ok(ProcessedArchive {
    root,
    manifest,
    bytes,
  })
}
