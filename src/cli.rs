//! Command line surface: argument parsing and configuration overrides.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use crate::config::PackerConfig;
use crate::models::{AppRequest, AppRequestError};

/// Repackage a GitHub-hosted static site as an offline application cache bundle.
#[derive(Debug, Parser)]
#[command(name = "appcache-packer", version, about)]
pub struct Cli {
  /// Repository owner (user or organisation).
  pub owner: String,
  /// Repository name.
  pub repo: String,
  /// Branch, tag or commit to package.
  pub branch: String,

  /// Directory the `<branch>.zip` archive is written to.
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// CORS proxy base URL; pass an empty string to download directly.
  #[arg(long)]
  pub proxy: Option<String>,

  /// Directory or http(s) URL the bundled resources are loaded from.
  #[arg(long)]
  pub assets: Option<String>,

  /// Configuration file; defaults to `appcache.config.json` in the working directory.
  #[arg(short, long)]
  pub config: Option<PathBuf>,
}

impl Cli {
  /// Validated repository coordinates.
  pub fn request(&self) -> Result<AppRequest, AppRequestError> {
    AppRequest::new(&self.owner, &self.repo, &self.branch)
  }

  /// Load configuration and apply command line overrides on top of it.
  pub fn resolve_config(&self, working_dir: &Path) -> Result<PackerConfig> {
    let mut config = match &self.config {
      Some(path) => PackerConfig::from_path(path)?,
      None => PackerConfig::discover(working_dir),
    };

    if let Some(output) = &self.output {
      config.output_dir = output.clone();
    }
    if let Some(proxy) = &self.proxy {
      config.proxy = proxy.clone();
    }
    if let Some(assets) = &self.assets {
      config.assets_base = assets.clone();
    }
    Ok(config)
  }
}
