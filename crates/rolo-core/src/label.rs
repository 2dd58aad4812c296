//! Label-set normalization and per-version label vocabularies.
//!
//! A field label is a comma-delimited set of type tokens (`home,pref`).
//! The normalized display form is lowercased, alphabetically sorted with
//! `pref` forced last, and joined with `", "`. Unknown tokens are custom
//! labels and pass through untouched.

use std::cmp::Ordering;

use crate::Version;

/// Split a label into trimmed, lowercased tokens, dropping empties.
pub fn tokens(label: &str) -> Vec<String> {
  label
    .split(',')
    .map(|t| t.trim().to_lowercase())
    .filter(|t| !t.is_empty())
    .collect()
}

/// Sort tokens alphabetically with `pref` last.
pub fn sort_tokens(tokens: &mut [String]) {
  tokens.sort_by(|a, b| match (a == "pref", b == "pref") {
    (true, false) => Ordering::Greater,
    (false, true) => Ordering::Less,
    _ => a.cmp(b),
  });
}

/// The normalized display form of a label set.
pub fn normalize(label: &str) -> String {
  let mut t = tokens(label);
  sort_tokens(&mut t);
  t.join(", ")
}

/// The label-keyed field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Phone,
  Email,
  Address,
}

/// Known type tokens per field kind and format version.
///
/// Consulted for template documentation and custom-label detection only;
/// the card accepts custom labels deliberately and never validates against
/// these tables.
pub fn known_labels(kind: FieldKind, version: Version) -> &'static [&'static str] {
  match (kind, version) {
    (FieldKind::Phone, Version::V3) => &[
      "bbs", "car", "cell", "fax", "home", "isdn", "msg", "modem", "pager",
      "pcs", "pref", "video", "voice", "work",
    ],
    (FieldKind::Phone, Version::V4) => &[
      "cell", "fax", "home", "pager", "pref", "text", "textphone", "video",
      "voice", "work",
    ],
    (FieldKind::Email, Version::V3) => {
      &["home", "internet", "pref", "work", "x400"]
    }
    (FieldKind::Email, Version::V4) => &["home", "internet", "pref", "work"],
    (FieldKind::Address, Version::V3) => {
      &["dom", "home", "intl", "parcel", "postal", "pref", "work"]
    }
    (FieldKind::Address, Version::V4) => &["home", "pref", "work"],
  }
}

/// True when the label must be stored as a grouped `X-ABLABEL` side-record
/// instead of `TYPE` parameters: a single token outside the known
/// vocabulary.
pub fn is_custom(tokens: &[String], kind: FieldKind, version: Version) -> bool {
  match tokens {
    [single] => !known_labels(kind, version).contains(&single.as_str()),
    _ => false,
  }
}
