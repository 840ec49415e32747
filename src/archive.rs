//! In-memory zip archive model used while repackaging a site.

use std::io::{Cursor, Read, Write};

use anyhow::{Context, Result, anyhow};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A single archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
  /// Slash separated path; directories end with `/`.
  pub path: String,
  /// File contents, `None` for directories.
  pub contents: Option<Vec<u8>>,
  /// Unix permission bits recorded in the source archive, if any.
  pub unix_mode: Option<u32>,
}

impl ArchiveEntry {
  /// Whether the entry represents a directory.
  pub fn is_dir(&self) -> bool {
    self.contents.is_none()
  }
}

/// Ordered collection of archive members that can be read, edited and re-serialised.
#[derive(Debug, Clone, Default)]
pub struct AppArchive {
  entries: Vec<ArchiveEntry>,
}

impl AppArchive {
  /// Parse zip bytes into an editable archive.
  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    let mut zip = ZipArchive::new(Cursor::new(bytes)).context("failed to read zip archive")?;
    let mut entries = Vec::with_capacity(zip.len());

    for index in 0..zip.len() {
      let mut file = zip
        .by_index(index)
        .with_context(|| format!("failed to read archive entry {index}"))?;
      let path = file.name().replace('\\', "/");
      let unix_mode = file.unix_mode();

      let contents = if file.is_dir() {
        None
      } else {
        let mut buffer = Vec::new();
        file
          .read_to_end(&mut buffer)
          .with_context(|| format!("failed to extract {path}"))?;
        Some(buffer)
      };

      entries.push(ArchiveEntry {
        path,
        contents,
        unix_mode,
      });
    }

    Ok(Self { entries })
  }

  /// All entries in archive order.
  pub fn entries(&self) -> &[ArchiveEntry] {
    &self.entries
  }

  /// Contents of the file at `path`, if present.
  pub fn file(&self, path: &str) -> Option<&[u8]> {
    self
      .entries
      .iter()
      .find(|entry| entry.path == path)
      .and_then(|entry| entry.contents.as_deref())
  }

  /// Insert or replace the file at `path`.
  ///
  /// Replaced entries keep their position; new entries are appended.
  pub fn set_file(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
    let path = path.into();
    let contents = Some(contents.into());
    match self
      .entries
      .iter_mut()
      .find(|entry| entry.path == path && !entry.is_dir())
    {
      Some(existing) => existing.contents = contents,
      None => self.entries.push(ArchiveEntry {
        path,
        contents,
        unix_mode: None,
      }),
    }
  }

  /// The first top-level folder of the archive, including its trailing slash.
  ///
  /// Explicit top-level directory entries win; otherwise the folder implied by the first
  /// nested path is used.
  pub fn first_folder(&self) -> Option<String> {
    let explicit = self
      .entries
      .iter()
      .filter(|entry| entry.is_dir())
      .map(|entry| entry.path.trim_matches('/'))
      .find(|name| !name.is_empty() && !name.contains('/'))
      .map(|name| format!("{name}/"));
    if explicit.is_some() {
      return explicit;
    }

    self.entries.iter().find_map(|entry| {
      entry
        .path
        .split_once('/')
        .filter(|(head, _)| !head.is_empty())
        .map(|(head, _)| format!("{head}/"))
    })
  }

  /// Locate the site root holding `index_name`.
  ///
  /// Returns the root prefix (empty for flat archives) or an error when neither the archive
  /// root nor its first folder contains the entry point.
  pub fn locate_root(&self, index_name: &str) -> Result<String> {
    if self.file(index_name).is_some() {
      return Ok(String::new());
    }

    let root = self
      .first_folder()
      .ok_or_else(|| anyhow!("No {index_name}"))?;
    if self.file(&format!("{root}{index_name}")).is_none() {
      return Err(anyhow!("No {index_name}"));
    }
    Ok(root)
  }

  /// Paths of every file below `root`, with the root prefix stripped, in archive order.
  pub fn file_paths_under(&self, root: &str) -> Vec<String> {
    self
      .entries
      .iter()
      .filter(|entry| !entry.is_dir())
      .filter_map(|entry| entry.path.strip_prefix(root))
      .filter(|relative| !relative.is_empty())
      .map(str::to_string)
      .collect()
  }

  /// Serialise the archive, deflating file contents.
  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in &self.entries {
      let mut options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
      if let Some(mode) = entry.unix_mode {
        options = options.unix_permissions(mode);
      }

      match &entry.contents {
        None => writer
          .add_directory(entry.path.as_str(), options)
          .with_context(|| format!("failed to add directory {}", entry.path))?,
        Some(contents) => {
          writer
            .start_file(entry.path.as_str(), options)
            .with_context(|| format!("failed to add file {}", entry.path))?;
          writer
            .write_all(contents)
            .with_context(|| format!("failed to write {}", entry.path))?;
        }
      }
    }

    let cursor = writer.finish().context("failed to finalise zip archive")?;
    Ok(cursor.into_inner())
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  /// Build zip bytes from `(path, contents)` pairs; `None` marks a directory.
  pub(crate) fn zip_bytes(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (path, contents) in entries {
      match contents {
        None => writer.add_directory(*path, options).unwrap(),
        Some(text) => {
          writer.start_file(*path, options).unwrap();
          writer.write_all(text.as_bytes()).unwrap();
        }
      }
    }
    writer.finish().unwrap().into_inner()
  }

  #[test]
  fn reads_files_and_directories_in_order() {
    let bytes = zip_bytes(&[
      ("site-main/", None),
      ("site-main/index.html", Some("<html></html>")),
      ("site-main/css/", None),
      ("site-main/css/app.css", Some("body{}")),
    ]);
    let archive = AppArchive::from_bytes(&bytes).unwrap();

    let paths: Vec<&str> = archive.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec![
      "site-main/",
      "site-main/index.html",
      "site-main/css/",
      "site-main/css/app.css"
    ]);
    assert_eq!(archive.file("site-main/css/app.css"), Some(&b"body{}"[..]));
    assert_eq!(archive.file("site-main/css/"), None);
  }

  #[test]
  fn rejects_bytes_that_are_not_a_zip() {
    assert!(AppArchive::from_bytes(b"<html>not a zip</html>").is_err());
  }

  #[test]
  fn locates_flat_root() {
    let bytes = zip_bytes(&[("index.html", Some("x")), ("app.js", Some("y"))]);
    let archive = AppArchive::from_bytes(&bytes).unwrap();
    assert_eq!(archive.locate_root("index.html").unwrap(), "");
  }

  #[test]
  fn locates_single_folder_root() {
    let bytes = zip_bytes(&[
      ("pages-gh-pages/", None),
      ("pages-gh-pages/index.html", Some("x")),
    ]);
    let archive = AppArchive::from_bytes(&bytes).unwrap();
    assert_eq!(archive.locate_root("index.html").unwrap(), "pages-gh-pages/");
  }

  #[test]
  fn locates_root_implied_without_directory_entries() {
    let bytes = zip_bytes(&[
      ("pages-main/index.html", Some("x")),
      ("pages-main/app.js", Some("y")),
    ]);
    let archive = AppArchive::from_bytes(&bytes).unwrap();
    assert_eq!(archive.locate_root("index.html").unwrap(), "pages-main/");
  }

  #[test]
  fn ignores_nested_directory_entries_when_finding_root() {
    let bytes = zip_bytes(&[
      ("site/index.html", Some("x")),
      ("site/css/", None),
      ("site/css/a.css", Some("y")),
    ]);
    let archive = AppArchive::from_bytes(&bytes).unwrap();
    assert_eq!(archive.first_folder().as_deref(), Some("site/"));
    assert_eq!(archive.locate_root("index.html").unwrap(), "site/");
  }

  #[test]
  fn prefers_explicit_top_level_directory() {
    let bytes = zip_bytes(&[
      ("site/css/", None),
      ("pages/", None),
      ("pages/index.html", Some("x")),
    ]);
    let archive = AppArchive::from_bytes(&bytes).unwrap();
    assert_eq!(archive.first_folder().as_deref(), Some("pages/"));
  }

  #[test]
  fn fails_without_index_at_root_or_folder() {
    let bytes = zip_bytes(&[
      ("pages-main/", None),
      ("pages-main/docs/index.html", Some("x")),
      ("pages-main/README.md", Some("y")),
    ]);
    let archive = AppArchive::from_bytes(&bytes).unwrap();
    let err = archive.locate_root("index.html").unwrap_err();
    assert_eq!(err.to_string(), "No index.html");

    let empty = AppArchive::from_bytes(&zip_bytes(&[("README.md", Some("y"))])).unwrap();
    assert!(empty.locate_root("index.html").is_err());
  }

  #[test]
  fn set_file_replaces_in_place_and_appends_new() {
    let bytes = zip_bytes(&[("a.txt", Some("1")), ("b.txt", Some("2"))]);
    let mut archive = AppArchive::from_bytes(&bytes).unwrap();

    archive.set_file("a.txt", "updated");
    archive.set_file("c.txt", "3");

    let paths: Vec<&str> = archive.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["a.txt", "b.txt", "c.txt"]);
    assert_eq!(archive.file("a.txt"), Some(&b"updated"[..]));
  }

  #[test]
  fn lists_files_relative_to_root() {
    let bytes = zip_bytes(&[
      ("site/", None),
      ("site/index.html", Some("x")),
      ("site/js/", None),
      ("site/js/app.js", Some("y")),
      ("stray.txt", Some("z")),
    ]);
    let archive = AppArchive::from_bytes(&bytes).unwrap();
    assert_eq!(archive.file_paths_under("site/"), vec!["index.html", "js/app.js"]);
    assert_eq!(archive.file_paths_under("").len(), 3);
  }

  #[test]
  fn serialises_edits_back_to_zip() {
    let bytes = zip_bytes(&[("site/", None), ("site/index.html", Some("old"))]);
    let mut archive = AppArchive::from_bytes(&bytes).unwrap();
    archive.set_file("site/index.html", "new");
    archive.set_file("site/extra.js", "js");

    let reparsed = AppArchive::from_bytes(&archive.to_bytes().unwrap()).unwrap();
    assert_eq!(reparsed.entries().len(), 3);
    assert!(reparsed.entries()[0].is_dir());
    assert_eq!(reparsed.file("site/index.html"), Some(&b"new"[..]));
    assert_eq!(reparsed.file("site/extra.js"), Some(&b"js"[..]));
  }
}
