//! The generic vCard property tree.
//!
//! A [`crate::Card`] owns a flat list of properties. The value of a
//! property is kept structurally decoded: semicolon-separated components,
//! each itself a comma-separated value list. `N:a,b;c` becomes
//! `[["a", "b"], ["c"]]`; a plain text property holds a single component
//! with a single value.

use serde::{Deserialize, Serialize};

/// One decoded vCard content line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
  /// Group prefix: `item1.TEL` carries `Some("item1")`.
  pub group:      Option<String>,
  /// Property name, uppercased (`TEL`, `X-ABLABEL`).
  pub name:       String,
  /// Parameters in occurrence order, names uppercased. Multi-valued
  /// parameters (`TYPE=home,pref`) are stored as one entry per value.
  pub params:     Vec<(String, String)>,
  /// Structured value components.
  pub components: Vec<Vec<String>>,
}

impl Property {
  pub fn new(name: &str) -> Self {
    Property {
      name: name.to_uppercase(),
      ..Property::default()
    }
  }

  /// A property with a single plain-text value.
  pub fn text(name: &str, value: impl Into<String>) -> Self {
    let mut prop = Property::new(name);
    prop.components = vec![vec![value.into()]];
    prop
  }

  /// The value as plain text: the first value of the first component, or
  /// the empty string.
  pub fn as_text(&self) -> &str {
    self
      .components
      .first()
      .and_then(|c| c.first())
      .map_or("", String::as_str)
  }

  /// The value as a flat list: the first component's values.
  pub fn as_list(&self) -> &[String] {
    self.components.first().map_or(&[], Vec::as_slice)
  }

  /// The `i`-th component, or an empty slice.
  pub fn component(&self, i: usize) -> &[String] {
    self.components.get(i).map_or(&[], Vec::as_slice)
  }

  /// All values of the parameter `name` (case-insensitive).
  pub fn param_values(&self, name: &str) -> Vec<&str> {
    self
      .params
      .iter()
      .filter(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
      .collect()
  }

  pub fn set_param(&mut self, name: &str, value: impl Into<String>) {
    self.params.push((name.to_uppercase(), value.into()));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_constructor_round_trips() {
    let p = Property::text("fn", "Test vCard");
    assert_eq!(p.name, "FN");
    assert_eq!(p.as_text(), "Test vCard");
  }

  #[test]
  fn empty_property_reads_as_empty() {
    let p = Property::new("NOTE");
    assert_eq!(p.as_text(), "");
    assert!(p.as_list().is_empty());
    assert!(p.component(3).is_empty());
  }

  #[test]
  fn param_values_collects_repeated_params() {
    let mut p = Property::new("TEL");
    p.set_param("TYPE", "home");
    p.set_param("TYPE", "pref");
    p.set_param("VALUE", "text");
    assert_eq!(p.param_values("type"), vec!["home", "pref"]);
    assert_eq!(p.param_values("VALUE"), vec!["text"]);
  }
}
