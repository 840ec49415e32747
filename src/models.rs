//! Data structures shared between fetching, packing and delivery.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Repository coordinates supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRequest {
  /// Account or organisation owning the repository.
  pub owner: String,
  /// Repository name.
  pub repo: String,
  /// Branch, tag or commit reference to download.
  pub branch: String,
}

/// Errors raised while validating an [`AppRequest`].
#[derive(Debug, PartialEq, Eq)]
pub enum AppRequestError {
  /// One or more of the mandatory fields was blank.
  MissingField {
    /// Name of the first blank field.
    field: &'static str,
  },
}

impl AppRequest {
  /// Build a request from raw user input, trimming each field.
  pub fn new(
    owner: impl AsRef<str>,
    repo: impl AsRef<str>,
    branch: impl AsRef<str>,
  ) -> Result<Self, AppRequestError> {
    let owner = required("owner", owner.as_ref())?;
    let repo = required("repo", repo.as_ref())?;
    let branch = required("branch", branch.as_ref())?;
    Ok(Self { owner, repo, branch })
  }
}

fn required(field: &'static str, value: &str) -> Result<String, AppRequestError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(AppRequestError::MissingField { field });
  }
  Ok(trimmed.to_string())
}

impl std::fmt::Display for AppRequestError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::MissingField { field } => {
        write!(f, "User, repo and branch are mandatory! ({field} is empty)")
      }
    }
  }
}

impl std::error::Error for AppRequestError {}

/// One bundled resource: where it is read from and where it lands in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceEntry {
  /// Path relative to the configured asset base.
  pub source: String,
  /// Destination path relative to the site root inside the archive.
  pub target: String,
}

impl ResourceEntry {
  /// Convenience constructor used by the default resource map and tests.
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      target: target.into(),
    }
  }
}

/// How a resource is referenced from the rewritten entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
  /// Referenced with a `<script>` element.
  Script,
  /// Referenced with a stylesheet `<link>` element.
  Stylesheet,
}

impl ResourceKind {
  /// Classify a destination path by its final extension.
  pub fn from_target(target: &str) -> Option<Self> {
    match Path::new(target).extension()?.to_str()? {
      "js" => Some(Self::Script),
      "css" => Some(Self::Stylesheet),
      _ => None,
    }
  }
}

/// Resource bytes ready to be inserted into the archive.
#[derive(Debug, Clone)]
pub struct LoadedResource {
  /// Destination path relative to the site root.
  pub target: String,
  /// Raw file contents.
  pub bytes: Vec<u8>,
}

/// Finished offline bundle returned by [`crate::OfflinePacker`].
#[derive(Debug, Clone)]
pub struct PackedApp {
  /// Suggested download name, `<branch>.zip`.
  pub file_name: String,
  /// Folder prefix the site lives under inside the archive, empty for flat archives.
  pub root: String,
  /// Generated cache manifest text.
  pub manifest: String,
  /// Serialized zip archive.
  pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trims_request_fields() {
    let request = AppRequest::new(" octo ", "site\n", "\tgh-pages").unwrap();
    assert_eq!(request.owner, "octo");
    assert_eq!(request.repo, "site");
    assert_eq!(request.branch, "gh-pages");
  }

  #[test]
  fn rejects_blank_fields() {
    let err = AppRequest::new("octo", "   ", "main").unwrap_err();
    assert_eq!(err, AppRequestError::MissingField { field: "repo" });
    assert!(err.to_string().starts_with("User, repo and branch are mandatory!"));
  }

  #[test]
  fn classifies_resource_targets() {
    assert_eq!(ResourceKind::from_target("a/b.js"), Some(ResourceKind::Script));
    assert_eq!(
      ResourceKind::from_target("a/b.min.css"),
      Some(ResourceKind::Stylesheet)
    );
    assert_eq!(ResourceKind::from_target("a/b.png"), None);
    assert_eq!(ResourceKind::from_target("js"), None);
  }
}
