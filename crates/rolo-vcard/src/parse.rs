//! vCard 3.0 / 4.0 content-line parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ unfold_lines()         → Vec<String>
//!          └─ parse_content_line() → Property
//!               └─ Card::from_properties() → Card

use rolo_core::{Card, Property};

use crate::error::{Error, Result};

// ─── Low-level helpers ───────────────────────────────────────────────────────

/// Join CRLF+SP (or LF+SP / LF+HT) continuation lines (RFC 6350 §3.2).
/// Tolerates bare LF line endings for real-world robustness.
pub(crate) fn unfold_lines(s: &str) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();
  for raw in s.split('\n') {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if line.starts_with(' ') || line.starts_with('\t') {
      if let Some(last) = lines.last_mut() {
        last.push_str(&line[1..]);
      }
      // else: leading continuation with no prior line — discard
    } else {
      lines.push(line.to_string());
    }
  }
  lines.retain(|l| !l.is_empty());
  lines
}

/// Find the first `:` that is not inside a double-quoted string.
fn find_unquoted_colon(s: &str) -> Option<usize> {
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ':' if !in_quotes => return Some(i),
      _ => {}
    }
  }
  None
}

/// Split on `;` while respecting double-quoted strings.
fn split_semicolons_respecting_quotes(s: &str) -> Vec<&str> {
  let mut result = Vec::new();
  let mut start = 0usize;
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ';' if !in_quotes => {
        result.push(&s[start..i]);
        start = i + 1;
      }
      _ => {}
    }
  }
  result.push(&s[start..]);
  result
}

/// Split a value on an unescaped separator, leaving escape sequences in the
/// pieces for a later [`unescape_value`] pass.
fn split_unescaped(s: &str, sep: char) -> Vec<String> {
  let mut parts = Vec::new();
  let mut current = String::new();
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      current.push('\\');
      if let Some(next) = chars.next() {
        current.push(next);
      }
    } else if c == sep {
      parts.push(std::mem::take(&mut current));
    } else {
      current.push(c);
    }
  }
  parts.push(current);
  parts
}

fn unescape_value(s: &str) -> String {
  let mut result = String::with_capacity(s.len());
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      match chars.next() {
        Some('n') | Some('N') => result.push('\n'),
        Some('\\') => result.push('\\'),
        Some(',') => result.push(','),
        Some(';') => result.push(';'),
        Some(other) => {
          result.push('\\');
          result.push(other);
        }
        None => result.push('\\'),
      }
    } else {
      result.push(c);
    }
  }
  result
}

// ─── Value structure classification ──────────────────────────────────────────

/// Properties whose value is a semicolon-separated component structure.
fn is_structured(name: &str) -> bool {
  matches!(name, "N" | "ADR" | "ORG" | "GENDER")
}

/// Properties whose value is a comma-separated list.
fn is_list(name: &str) -> bool {
  matches!(name, "NICKNAME" | "CATEGORIES")
}

/// Decode a raw value string into structural components per the property's
/// class: structured values split on `;` then `,`, list values on `,`, and
/// plain text stays one value.
fn decode_components(name: &str, raw: &str) -> Vec<Vec<String>> {
  let values = |piece: &str| -> Vec<String> {
    split_unescaped(piece, ',')
      .iter()
      .map(|v| unescape_value(v.trim()))
      .filter(|v| !v.is_empty())
      .collect()
  };
  if is_structured(name) {
    split_unescaped(raw, ';').iter().map(|c| values(c)).collect()
  } else if is_list(name) {
    vec![values(raw)]
  } else {
    vec![vec![unescape_value(raw)]]
  }
}

// ─── Content-line parser ─────────────────────────────────────────────────────

pub(crate) fn parse_content_line(line: &str) -> Result<Property> {
  let colon_pos = find_unquoted_colon(line)
    .ok_or_else(|| Error::MalformedContentLine(line.to_string()))?;

  let name_part = &line[..colon_pos];
  let raw_value = &line[colon_pos + 1..];

  let tokens = split_semicolons_respecting_quotes(name_part);
  let name_token = tokens
    .first()
    .copied()
    .filter(|t| !t.trim().is_empty())
    .ok_or_else(|| Error::MalformedContentLine(line.to_string()))?;

  // Separate the group prefix ("item1.TEL" → group "item1", name "TEL").
  let (group, name) = match name_token.find('.') {
    Some(dot) => (
      Some(name_token[..dot].to_string()),
      name_token[dot + 1..].to_uppercase(),
    ),
    None => (None, name_token.to_uppercase()),
  };

  let mut prop = Property::new(&name);
  prop.group = group;
  for token in &tokens[1..] {
    if let Some(eq_pos) = token.find('=') {
      let param_name = token[..eq_pos].trim();
      for value in token[eq_pos + 1..].split(',') {
        let value = value.trim().trim_matches('"');
        if !value.is_empty() {
          prop.set_param(param_name, value);
        }
      }
    } else {
      // Bare token is shorthand for TYPE=token (vCard 3.0 compat).
      let t = token.trim();
      if !t.is_empty() {
        prop.set_param("TYPE", t);
      }
    }
  }
  prop.components = decode_components(&prop.name, raw_value);
  Ok(prop)
}

// ─── Card parser ─────────────────────────────────────────────────────────────

/// Parse a single vCard from `input`.
pub fn parse_one(input: &str) -> Result<Card> {
  let lines = unfold_lines(input);

  let start = lines
    .iter()
    .position(|l| l.eq_ignore_ascii_case("BEGIN:VCARD"))
    .ok_or(Error::MissingEnvelope)?;
  let end = lines
    .iter()
    .rposition(|l| l.eq_ignore_ascii_case("END:VCARD"))
    .ok_or(Error::MissingEnvelope)?;
  if end <= start {
    return Err(Error::MissingEnvelope);
  }

  let mut props = Vec::new();
  for line in &lines[start + 1..end] {
    props.push(parse_content_line(line)?);
  }
  Ok(Card::from_properties(props))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use rolo_core::Version;

  use super::*;

  // ── Envelope ─────────────────────────────────────────────────────────────

  #[test]
  fn missing_envelope_returns_error() {
    assert!(matches!(
      parse_one("FN:Alice"),
      Err(Error::MissingEnvelope)
    ));
  }

  #[test]
  fn end_before_begin_returns_error() {
    assert!(matches!(
      parse_one("END:VCARD\r\nBEGIN:VCARD"),
      Err(Error::MissingEnvelope)
    ));
  }

  #[test]
  fn content_line_without_colon_is_an_error() {
    let input = "BEGIN:VCARD\r\nVERSION;3.0\r\nEND:VCARD\r\n";
    assert!(matches!(
      parse_one(input),
      Err(Error::MalformedContentLine(_))
    ));
  }

  // ── Version extraction ───────────────────────────────────────────────────

  #[test]
  fn version_is_read_from_the_record() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Alice\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    assert_eq!(card.version(), Version::V4);
  }

  #[test]
  fn missing_version_defaults_to_v3() {
    let input = "BEGIN:VCARD\r\nFN:Alice\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    assert_eq!(card.version(), Version::V3);
  }

  // ── Structural decoding ──────────────────────────────────────────────────

  #[test]
  fn n_record_splits_into_components() {
    let input =
      "BEGIN:VCARD\r\nVERSION:3.0\r\nN:family;given;;;\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    let name = card.structured_name().unwrap();
    assert_eq!(name.family, vec!["family"]);
    assert_eq!(name.given, vec!["given"]);
    assert!(name.additional.is_empty());
  }

  #[test]
  fn adr_seven_field_split() {
    let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nADR;TYPE=work:box;extended;123 \
                 Main St;Springfield;IL;62701;USA\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    let addresses = card.post_addresses();
    let work = &addresses["work"][0];
    assert_eq!(work.po_box, vec!["box"]);
    assert_eq!(work.extended, vec!["extended"]);
    assert_eq!(work.street, vec!["123 Main St"]);
    assert_eq!(work.city, vec!["Springfield"]);
    assert_eq!(work.region, vec!["IL"]);
    assert_eq!(work.code, vec!["62701"]);
    assert_eq!(work.country, vec!["USA"]);
  }

  #[test]
  fn org_units_become_a_path() {
    let input =
      "BEGIN:VCARD\r\nVERSION:3.0\r\nORG:Org;Sub1;Sub2\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    assert_eq!(
      card.organisations(),
      vec![vec!["Org".to_string(), "Sub1".to_string(), "Sub2".to_string()]]
    );
  }

  #[test]
  fn categories_split_on_commas() {
    let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nCATEGORIES:rfc,address \
                 book\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    assert_eq!(
      card.categories(),
      vec![vec!["rfc".to_string(), "address book".to_string()]]
    );
  }

  #[test]
  fn note_keeps_semicolons_and_decodes_newlines() {
    let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nNOTE:one\\; two\\nand \
                 three\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    assert_eq!(card.notes(), vec!["one; two\nand three"]);
  }

  // ── Params and groups ────────────────────────────────────────────────────

  #[test]
  fn type_param_lists_are_split() {
    let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nTEL;TYPE=home,pref:\
                 0123456789\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    let numbers = card.phone_numbers();
    assert_eq!(numbers["home, pref"], vec!["0123456789".to_string()]);
  }

  #[test]
  fn bare_param_token_is_treated_as_type() {
    let input =
      "BEGIN:VCARD\r\nVERSION:3.0\r\nTEL;HOME:0123456789\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    assert!(card.phone_numbers().contains_key("home"));
  }

  #[test]
  fn grouped_ablabel_supplies_a_custom_label() {
    let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nitem1.TEL:0123456789\r\nitem1.\
                 X-ABLABEL:custom_type\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    let numbers = card.phone_numbers();
    assert_eq!(numbers["custom_type"], vec!["0123456789".to_string()]);
  }

  // ── Folding ──────────────────────────────────────────────────────────────

  #[test]
  fn folded_lines_are_unfolded() {
    let input =
      "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Alice\r\n  Smith\r\nEND:VCARD\r\n";
    let card = parse_one(input).unwrap();
    assert_eq!(card.formatted_name(), "Alice Smith");
  }
}
