//! vCard format versions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two supported revisions of the vCard standard.
///
/// The dialects differ in their legal date encodings (4.0 allows `--MM-DD`
/// partial dates and free-text values) and in their label vocabularies.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum Version {
  /// vCard 3.0 (RFC 2426).
  #[default]
  #[serde(rename = "3.0")]
  V3,
  /// vCard 4.0 (RFC 6350).
  #[serde(rename = "4.0")]
  V4,
}

impl Version {
  /// Parse a `VERSION` property value. Returns `None` for anything other
  /// than the two supported revisions; the caller decides the fallback.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim() {
      "3.0" => Some(Version::V3),
      "4.0" => Some(Version::V4),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Version::V3 => "3.0",
      Version::V4 => "4.0",
    }
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_supported_versions() {
    assert_eq!(Version::parse("3.0"), Some(Version::V3));
    assert_eq!(Version::parse("4.0"), Some(Version::V4));
    assert_eq!(Version::parse(" 4.0 "), Some(Version::V4));
  }

  #[test]
  fn rejects_unknown_versions() {
    assert_eq!(Version::parse("9.9"), None);
    assert_eq!(Version::parse("something unsupported"), None);
    assert_eq!(Version::parse(""), None);
  }

  #[test]
  fn default_is_v3() {
    assert_eq!(Version::default(), Version::V3);
    assert_eq!(Version::default().as_str(), "3.0");
  }
}
