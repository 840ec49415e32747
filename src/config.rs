//! Packer configuration loader describing the proxy, resource map and output layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::models::{ResourceEntry, ResourceKind};

/// File name searched for when discovering configuration in a directory.
pub const DEFAULT_CONFIG_FILE: &str = "appcache.config.json";

/// Discoverable packer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
  /// Base URL of the CORS proxy the archive download is relayed through.
  pub proxy: String,
  /// Origin used to build repository archive download URLs.
  pub github_base: String,
  /// File name of the generated cache manifest, relative to the site root.
  pub manifest_name: String,
  /// Entry point rewritten to declare the manifest.
  pub index_html_file: String,
  /// Directory or `http(s)` URL the resource sources are resolved against.
  pub assets_base: String,
  /// Directory the finished archive is written into.
  pub output_dir: PathBuf,
  /// Ordered mapping of bundled resources to their destination inside the site root.
  pub resources: Vec<ResourceEntry>,
}

impl Default for PackerConfig {
  fn default() -> Self {
    Self {
      proxy: "http://crossorigin.me".into(),
      github_base: "https://github.com".into(),
      manifest_name: "manifest.appcache".into(),
      index_html_file: "index.html".into(),
      assets_base: ".".into(),
      output_dir: PathBuf::from("."),
      resources: default_resources(),
    }
  }
}

fn default_resources() -> Vec<ResourceEntry> {
  [
    ("libs/add2home/addtohomescreen.css", "_bmw/add2home/addtohomescreen.css"),
    ("libs/add2home/addtohomescreen.js", "_bmw/add2home/addtohomescreen.js"),
    ("libs/add2home/init.js", "_bmw/add2home/init.js"),
  ]
  .into_iter()
  .map(|(source, target)| ResourceEntry::new(source, target))
  .collect()
}

impl PackerConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or unparsable file falls back to the defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(err) => {
        if candidate.exists() {
          tracing::warn!(path = %candidate.display(), error = %err, "Ignoring invalid configuration");
        }
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config: Self = serde_json::from_str(&content)
      .with_context(|| format!("failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
  }

  /// Reject resource maps the index rewriter cannot reference.
  pub fn validate(&self) -> Result<()> {
    if self.manifest_name.trim().is_empty() {
      bail!("manifest name must not be empty");
    }
    for entry in &self.resources {
      if ResourceKind::from_target(&entry.target).is_none() {
        bail!(
          "resource target {} must end in .js or .css",
          entry.target
        );
      }
    }
    Ok(())
  }
}
