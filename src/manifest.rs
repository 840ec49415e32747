//! Application cache manifest generation.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// Render a timestamp the way a JavaScript `Date` prints itself.
pub fn manifest_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  timestamp.format("%a %b %d %Y %H:%M:%S GMT%z").to_string()
}

/// Build the manifest text caching `paths` and allowing any other network request.
///
/// The timestamp comment changes on every build so browsers pick up the new bundle.
pub fn generate_manifest<Tz, S>(paths: &[S], generated_at: &DateTime<Tz>) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display,
  S: AsRef<str>,
{
  let mut lines = vec![
    "CACHE MANIFEST".to_string(),
    format!("# {}", manifest_timestamp(generated_at)),
    String::new(),
    "CACHE:".to_string(),
  ];
  lines.extend(paths.iter().map(|path| path.as_ref().to_string()));
  lines.extend([String::new(), "NETWORK:".to_string(), "*".to_string()]);
  lines.join("\n")
}

/// Paths listed in the `CACHE:` section of a manifest.
pub fn cached_paths(manifest: &str) -> Vec<&str> {
  manifest
    .lines()
    .skip_while(|line| *line != "CACHE:")
    .skip(1)
    .take_while(|line| !line.is_empty() && *line != "NETWORK:")
    .collect()
}
