//! Canonical field shapes.
//!
//! Fields in the human-editable document arrive in several legal shapes: a
//! bare scalar, a flat list, or a list of lists. [`FieldValue`] makes the
//! shape explicit as a tagged variant; the normalizers below reduce any
//! legal input to the canonical form for the field's category and reject
//! everything else with [`Error::MalformedShape`].
//!
//! Normalization is idempotent: re-normalizing canonical data yields the
//! same structure.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A raw field value of explicit shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
  Scalar(String),
  List(Vec<String>),
  /// One entry per multi-component group (e.g. company + unit).
  Grouped(Vec<Vec<String>>),
}

impl FieldValue {
  /// Canonical shape for scalar-or-list fields (nickname, note, webpage,
  /// title, role). A nested list is not legal here.
  pub fn into_list(self, field: &str) -> Result<Vec<String>> {
    match self {
      FieldValue::Scalar(s) => Ok(vec![s]),
      FieldValue::List(items) => Ok(items),
      FieldValue::Grouped(_) => Err(Error::MalformedShape {
        field: field.to_string(),
      }),
    }
  }

  /// Canonical shape for grouped fields (organisation, category). A flat
  /// list becomes one single-component group per item.
  pub fn into_groups(self, field: &str) -> Result<Vec<Vec<String>>> {
    match self {
      FieldValue::Scalar(s) => Ok(vec![vec![s]]),
      FieldValue::List(items) => {
        Ok(items.into_iter().map(|item| vec![item]).collect())
      }
      FieldValue::Grouped(groups) => Ok(groups),
    }
  }

  /// Canonical shape for single-valued fields (dates). Lists are not legal.
  pub fn into_scalar(self, field: &str) -> Result<String> {
    match self {
      FieldValue::Scalar(s) => Ok(s),
      _ => Err(Error::MalformedShape {
        field: field.to_string(),
      }),
    }
  }

  /// True when the value contains no non-empty string.
  pub fn is_empty(&self) -> bool {
    match self {
      FieldValue::Scalar(s) => s.trim().is_empty(),
      FieldValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
      FieldValue::Grouped(groups) => {
        groups.iter().flatten().all(|s| s.trim().is_empty())
      }
    }
  }
}

impl From<&str> for FieldValue {
  fn from(s: &str) -> Self {
    FieldValue::Scalar(s.to_string())
  }
}

impl From<Vec<String>> for FieldValue {
  fn from(items: Vec<String>) -> Self {
    FieldValue::List(items)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scalar_and_singleton_list_normalize_identically() {
    let a = FieldValue::Scalar("nick".into()).into_list("Nickname").unwrap();
    let b = FieldValue::List(vec!["nick".into()])
      .into_list("Nickname")
      .unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn into_list_rejects_nested_lists() {
    let v = FieldValue::Grouped(vec![vec!["a".into()]]);
    assert!(matches!(
      v.into_list("Nickname"),
      Err(Error::MalformedShape { field }) if field == "Nickname"
    ));
  }

  #[test]
  fn flat_list_becomes_single_component_groups() {
    let v = FieldValue::List(vec!["company1".into(), "company2".into()]);
    assert_eq!(
      v.into_groups("Organisation").unwrap(),
      vec![vec!["company1".to_string()], vec!["company2".to_string()]]
    );
  }

  #[test]
  fn normalization_is_idempotent() {
    let groups = vec![vec!["company".to_string(), "unit".to_string()]];
    let once = FieldValue::Grouped(groups.clone())
      .into_groups("Organisation")
      .unwrap();
    let twice = FieldValue::Grouped(once.clone())
      .into_groups("Organisation")
      .unwrap();
    assert_eq!(once, groups);
    assert_eq!(twice, groups);
  }

  #[test]
  fn emptiness_sees_through_nesting() {
    assert!(FieldValue::Scalar("  ".into()).is_empty());
    assert!(FieldValue::List(vec!["".into(), "".into()]).is_empty());
    assert!(!FieldValue::Grouped(vec![vec!["x".into()]]).is_empty());
  }
}
