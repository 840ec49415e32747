//! Entry point rewriting: manifest declaration and resource injection.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::{ResourceEntry, ResourceKind};

fn html_open_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)(<\s*html)").expect("invalid html tag regex"))
}

fn head_open_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)(<\s*head\s*>)").expect("invalid head tag regex"))
}

/// Apply every entry point mutation: manifest attribute first, then head resources.
pub fn rewrite_index(content: &str, manifest_name: &str, resources: &[ResourceEntry]) -> String {
  let with_manifest = add_manifest_attribute(content, manifest_name);
  add_resource_elements(&with_manifest, resources)
}

/// Declare the cache manifest on the first `<html` tag.
pub fn add_manifest_attribute(content: &str, manifest_name: &str) -> String {
  let pattern = html_open_pattern();
  if !pattern.is_match(content) {
    tracing::warn!("Entry point has no <html> tag; manifest attribute not added");
    return content.to_string();
  }

  pattern
    .replace(content, |caps: &Captures| {
      format!("{} manifest=\"{}\"", &caps[1], manifest_name)
    })
    .into_owned()
}

/// Insert one reference element per resource right after the first `<head>` tag.
pub fn add_resource_elements(content: &str, resources: &[ResourceEntry]) -> String {
  let pattern = head_open_pattern();
  if !pattern.is_match(content) {
    tracing::warn!("Entry point has no <head> tag; resources not referenced");
    return content.to_string();
  }

  let elements: Vec<String> = resources
    .iter()
    .filter_map(|entry| resource_element(&entry.target))
    .collect();

  pattern
    .replace(content, |caps: &Captures| {
      format!("{}\n{}", &caps[1], elements.join("\n"))
    })
    .into_owned()
}

/// Reference element for a destination path, chosen by its extension.
pub fn resource_element(target: &str) -> Option<String> {
  let src = encode_uri(target);
  let element = match ResourceKind::from_target(target)? {
    ResourceKind::Script => {
      format!("<script src=\"{src}\" type=\"text/javascript\"></script>")
    }
    ResourceKind::Stylesheet => {
      format!("<link href=\"{src}\" type=\"text/css\" rel=\"stylesheet\"/>")
    }
  };
  Some(element)
}

/// Percent-encode a URI the way ECMAScript `encodeURI` does.
pub fn encode_uri(value: &str) -> String {
  const RESERVED: &[u8] = b";,/?:@&=+$-_.!~*'()#";

  let mut encoded = String::with_capacity(value.len());
  for byte in value.bytes() {
    if byte.is_ascii_alphanumeric() || RESERVED.contains(&byte) {
      encoded.push(byte as char);
    } else {
      encoded.push_str(&format!("%{byte:02X}"));
    }
  }
  encoded
}
