//! Renders a card as the human-editable YAML document.
//!
//! Output is byte-deterministic: identical cards always produce identical
//! text. All label-keyed and list-valued fields are read through the
//! card's sorted accessors, and trivial values collapse (a singleton list,
//! or a singleton list of a singleton list, emits as a bare scalar).

use rolo_core::{Card, FieldValue, PostAddress, date};

/// Column the `:` separator is padded to for the top-level keys.
const TOP_COLON: usize = 12;
/// Column used for the address sub-keys.
const ADDRESS_COLON: usize = 8;

// ─── Scalar quoting ──────────────────────────────────────────────────────────

/// Single-quote a scalar that YAML would otherwise re-type (numbers, bools,
/// null) or mis-parse. Phone numbers with leading zeros depend on this.
fn quote_if_needed(s: &str) -> String {
  let lower = s.to_ascii_lowercase();
  let retyped = s.parse::<f64>().is_ok()
    || matches!(
      lower.as_str(),
      "true" | "false" | "null" | "yes" | "no" | "on" | "off" | "~"
    );
  let ambiguous = s.starts_with([
    '\'', '"', '|', '>', '&', '*', '[', ']', '{', '}', '#', '@', '`', '%',
  ]) || s.contains(": ")
    || s.ends_with(':');
  if retyped || ambiguous {
    format!("'{}'", s.replace('\'', "''"))
  } else {
    s.to_string()
  }
}

// ─── Field renderer ──────────────────────────────────────────────────────────

/// Render a multi-line value as an indented block, prefixed with the `|`
/// marker when enabled. Single-line values are trimmed and quoted.
fn indent_multiline(value: &str, indentation: usize, show_marker: bool) -> String {
  if value.contains('\n') {
    let mut lines = vec![if show_marker { "|" } else { "" }.to_string()];
    for line in value.split('\n') {
      lines.push(format!("{}{}", " ".repeat(indentation), line.trim()));
    }
    lines.join("\n")
  } else {
    quote_if_needed(value.trim())
  }
}

/// Render one field as document lines.
///
/// `colon_column` positions the `:` separator after the key; list items are
/// indented four spaces past the key, nested group items eight.
pub(crate) fn convert_to_yaml(
  name: &str,
  value: &FieldValue,
  indentation: usize,
  colon_column: usize,
  show_marker: bool,
) -> Vec<String> {
  let ind = " ".repeat(indentation);
  let pad = " ".repeat(colon_column.saturating_sub(name.len()));

  // Collapse trivial values to a bare scalar.
  let value = match value {
    FieldValue::List(items) if items.len() == 1 => {
      FieldValue::Scalar(items[0].clone())
    }
    FieldValue::Grouped(groups)
      if groups.len() == 1 && groups[0].len() == 1 =>
    {
      FieldValue::Scalar(groups[0][0].clone())
    }
    other => other.clone(),
  };

  let mut lines = Vec::new();
  match &value {
    FieldValue::Scalar(s) => {
      lines.push(format!(
        "{ind}{name}{pad}: {}",
        indent_multiline(s, indentation + 4, show_marker)
      ));
    }
    FieldValue::List(items) => {
      lines.push(format!("{ind}{name}{pad}: "));
      let item_ind = " ".repeat(indentation + 4);
      for item in items {
        lines.push(format!(
          "{item_ind}- {}",
          indent_multiline(item, indentation + 8, show_marker)
        ));
      }
    }
    FieldValue::Grouped(groups) => {
      lines.push(format!("{ind}{name}{pad}: "));
      let item_ind = " ".repeat(indentation + 4);
      let inner_ind = " ".repeat(indentation + 8);
      for group in groups {
        // A singleton group collapses to a plain item line.
        if let [single] = group.as_slice() {
          lines.push(format!(
            "{item_ind}- {}",
            indent_multiline(single, indentation + 8, show_marker)
          ));
          continue;
        }
        lines.push(format!("{item_ind}- "));
        for inner in group {
          lines.push(format!(
            "{inner_ind}- {}",
            indent_multiline(inner, indentation + 12, show_marker)
          ));
        }
      }
    }
  }
  lines
}

// ─── Document renderer ───────────────────────────────────────────────────────

fn name_part(lines: &mut Vec<String>, name: &str, parts: Vec<String>) {
  lines.extend(convert_to_yaml(
    name,
    &FieldValue::List(parts),
    0,
    TOP_COLON,
    true,
  ));
}

fn date_part(lines: &mut Vec<String>, card: &Card, name: &str, value: Option<date::DateValue>) {
  let text = match value {
    Some(date::DateValue::Text(s)) => format!("text={s}"),
    Some(v) => date::format_date(&v, card.utc_offset(), false),
    None => String::new(),
  };
  lines.extend(convert_to_yaml(
    name,
    &FieldValue::Scalar(text),
    0,
    TOP_COLON,
    true,
  ));
}

fn labeled_list(
  lines: &mut Vec<String>,
  name: &str,
  entries: &std::collections::BTreeMap<String, Vec<String>>,
) {
  lines.push(format!("{name}{}: ", " ".repeat(TOP_COLON - name.len())));
  for (label, values) in entries {
    lines.extend(convert_to_yaml(
      label,
      &FieldValue::List(values.clone()),
      4,
      0,
      true,
    ));
  }
}

fn address_fields(lines: &mut Vec<String>, address: &PostAddress, indentation: usize) {
  let parts: [(&str, &[String]); 7] = [
    ("Box", &address.po_box),
    ("Extended", &address.extended),
    ("Street", &address.street),
    ("Code", &address.code),
    ("City", &address.city),
    ("Region", &address.region),
    ("Country", &address.country),
  ];
  for (key, values) in parts {
    lines.extend(convert_to_yaml(
      key,
      &FieldValue::List(values.to_vec()),
      indentation,
      ADDRESS_COLON,
      true,
    ));
  }
}

/// Render `card` as the human-editable document, in the fixed section
/// order. `private_labels` is the configured extension-label list; every
/// configured label appears, populated or empty.
pub fn to_yaml(card: &Card, private_labels: &[String]) -> String {
  let mut lines: Vec<String> = Vec::new();

  let name = card.structured_name().unwrap_or_default();
  name_part(&mut lines, "Prefix", name.prefix);
  name_part(&mut lines, "First name", name.given);
  name_part(&mut lines, "Additional", name.additional);
  name_part(&mut lines, "Last name", name.family);
  name_part(&mut lines, "Suffix", name.suffix);

  name_part(&mut lines, "Nickname", card.nicknames());

  date_part(&mut lines, card, "Anniversary", card.anniversary());
  date_part(&mut lines, card, "Birthday", card.birthday());

  lines.extend(convert_to_yaml(
    "Organisation",
    &FieldValue::Grouped(card.organisations()),
    0,
    TOP_COLON,
    true,
  ));
  name_part(&mut lines, "Title", card.titles());
  name_part(&mut lines, "Role", card.roles());

  labeled_list(&mut lines, "Phone", &card.phone_numbers());
  labeled_list(&mut lines, "Email", &card.emails());

  lines.push(format!("Address{}: ", " ".repeat(TOP_COLON - 7)));
  for (label, addresses) in &card.post_addresses() {
    lines.push(format!("    {label}: "));
    if let [single] = addresses.as_slice() {
      address_fields(&mut lines, single, 8);
    } else {
      for address in addresses {
        lines.push("        - ".to_string());
        address_fields(&mut lines, address, 12);
      }
    }
  }

  lines.extend(convert_to_yaml(
    "Categories",
    &FieldValue::Grouped(card.categories()),
    0,
    TOP_COLON,
    true,
  ));
  name_part(&mut lines, "Webpage", card.webpages());

  lines.push(format!("Private{}: ", " ".repeat(TOP_COLON - 7)));
  let private = card.private_objects(private_labels);
  let longest = private_labels.iter().map(String::len).max().unwrap_or(0);
  for label in private_labels {
    let values = private.get(label).cloned().unwrap_or_default();
    lines.extend(convert_to_yaml(
      label,
      &FieldValue::List(values),
      4,
      longest,
      true,
    ));
  }

  name_part(&mut lines, "Note", card.notes());

  lines.join("\n") + "\n"
}

// ─── Tests ───────────────────────────────────────────────────────────────────
