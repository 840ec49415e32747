//! Delivering the packed archive to the user as a file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::PackedApp;

/// Download name for a branch, `<branch>.zip`.
///
/// Path separators are replaced so the file always lands directly in the output directory.
pub fn download_file_name(branch: &str) -> String {
  let safe: String = branch
    .chars()
    .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
    .collect();
  format!("{safe}.zip")
}

/// Write the packed archive into `output_dir`, replacing any previous download.
///
/// Bytes are staged next to the destination and renamed into place.
pub async fn write_artifact(output_dir: &Path, packed: &PackedApp) -> Result<PathBuf> {
  tokio::fs::create_dir_all(output_dir)
    .await
    .with_context(|| format!("failed to create {}", output_dir.display()))?;

  let destination = output_dir.join(&packed.file_name);
  let staging = output_dir.join(format!("{}.part", packed.file_name));

  tokio::fs::write(&staging, &packed.bytes)
    .await
    .with_context(|| format!("failed to write {}", staging.display()))?;
  if let Err(err) = tokio::fs::rename(&staging, &destination).await {
    let _ = tokio::fs::remove_file(&staging).await;
    return Err(err).with_context(|| format!("failed to move archive to {}", destination.display()));
  }

  tracing::info!(path = %destination.display(), bytes = packed.bytes.len(), "Wrote offline archive");
  Ok(destination)
}
