//! Applies an edited YAML document back onto a card.
//!
//! Every section the document carries replaces the matching fields on the
//! card wholesale (delete, then re-add), so an edit never duplicates
//! fields. Sections absent from the document leave the card untouched;
//! unrecognized top-level keys are warned about and skipped.

use rolo_core::{Card, FieldValue, PostAddress, Version, card, date};
use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::{Error, Result};

const KNOWN_KEYS: &[&str] = &[
  "Prefix",
  "First name",
  "Additional",
  "Last name",
  "Suffix",
  "Nickname",
  "Anniversary",
  "Birthday",
  "Organisation",
  "Title",
  "Role",
  "Phone",
  "Email",
  "Address",
  "Categories",
  "Webpage",
  "Private",
  "Note",
];

// ─── Value conversion ────────────────────────────────────────────────────────

/// A YAML scalar as its string spelling. Numbers and booleans are accepted
/// so that un-quoted phone numbers or `yes`/`no` notes survive.
fn scalar_to_string(value: &Value, field: &str) -> Result<String> {
  match value {
    Value::Null => Ok(String::new()),
    Value::String(s) => Ok(s.clone()),
    Value::Number(n) => Ok(n.to_string()),
    Value::Bool(b) => Ok(b.to_string()),
    _ => Err(
      rolo_core::Error::InvalidFieldValue {
        field:  field.to_string(),
        reason: "expected a scalar".to_string(),
      }
      .into(),
    ),
  }
}

/// A YAML node as an explicit [`FieldValue`], `None` when the node is null
/// or blank. Sequences of scalars become a flat list; a sequence with any
/// nested sequence becomes groups, with bare scalars promoted to singleton
/// groups.
fn field_value(value: &Value, field: &str) -> Result<Option<FieldValue>> {
  let converted = match value {
    Value::Null => return Ok(None),
    Value::Sequence(items) => {
      if items.iter().any(Value::is_sequence) {
        let mut groups = Vec::with_capacity(items.len());
        for item in items {
          match item {
            Value::Sequence(inner) => {
              let mut group = Vec::with_capacity(inner.len());
              for v in inner {
                group.push(scalar_to_string(v, field)?);
              }
              groups.push(group);
            }
            other => groups.push(vec![scalar_to_string(other, field)?]),
          }
        }
        FieldValue::Grouped(groups)
      } else {
        let mut list = Vec::with_capacity(items.len());
        for item in items {
          list.push(scalar_to_string(item, field)?);
        }
        FieldValue::List(list)
      }
    }
    other => FieldValue::Scalar(scalar_to_string(other, field)?),
  };
  if converted.is_empty() {
    Ok(None)
  } else {
    Ok(Some(converted))
  }
}

fn get<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
  map.get(key)
}

fn as_mapping<'a>(value: &'a Value, field: &str) -> Result<&'a Mapping> {
  value.as_mapping().ok_or_else(|| {
    rolo_core::Error::InvalidFieldValue {
      field:  field.to_string(),
      reason: "expected a label-to-value mapping".to_string(),
    }
    .into()
  })
}

// ─── Section appliers ────────────────────────────────────────────────────────

fn apply_name(card: &mut Card, doc: &Mapping) -> Result<()> {
  const PARTS: [&str; 5] =
    ["Prefix", "First name", "Additional", "Last name", "Suffix"];
  if !PARTS.iter().any(|k| get(doc, k).is_some()) {
    return Ok(());
  }
  let part = |key: &str| -> Result<FieldValue> {
    Ok(match get(doc, key) {
      Some(v) => {
        field_value(v, key)?.unwrap_or(FieldValue::Scalar(String::new()))
      }
      None => FieldValue::Scalar(String::new()),
    })
  };
  card.delete_field("N");
  card.add_name(
    part("Prefix")?,
    part("First name")?,
    part("Additional")?,
    part("Last name")?,
    part("Suffix")?,
  )?;

  // The display name is derived, not edited: first-last ordering, with
  // the organisation standing in for nameless cards.
  let mut display = card.first_name_last_name();
  if display.is_empty() {
    if let Some(org) = card.organisations().first() {
      display = org.join(" ");
    }
  }
  card.set_formatted_name(&display);
  Ok(())
}

fn apply_list(
  card: &mut Card,
  doc: &Mapping,
  key: &str,
  raw_name: &str,
  add: fn(&mut Card, &str),
) -> Result<()> {
  let Some(node) = get(doc, key) else {
    return Ok(());
  };
  card.delete_field(raw_name);
  let Some(value) = field_value(node, key)? else {
    return Ok(());
  };
  for item in value.into_list(key)? {
    if !item.trim().is_empty() {
      add(card, &item);
    }
  }
  Ok(())
}

fn apply_grouped(
  card: &mut Card,
  doc: &Mapping,
  key: &str,
  raw_name: &str,
  add: fn(&mut Card, Vec<String>),
) -> Result<()> {
  let Some(node) = get(doc, key) else {
    return Ok(());
  };
  card.delete_field(raw_name);
  let Some(value) = field_value(node, key)? else {
    return Ok(());
  };
  for group in value.into_groups(key)? {
    let group: Vec<String> = group
      .into_iter()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();
    if !group.is_empty() {
      add(card, group);
    }
  }
  Ok(())
}

fn apply_date(
  card: &mut Card,
  doc: &Mapping,
  key: &str,
  set: fn(&mut Card, date::DateValue),
  raw_names: &[&str],
) -> Result<()> {
  let Some(node) = get(doc, key) else {
    return Ok(());
  };
  for name in raw_names {
    card.delete_field(name);
  }
  let Some(value) = field_value(node, key)? else {
    return Ok(());
  };
  let raw = value.into_scalar(key)?;
  let raw = raw.trim();
  let parsed = if let Some(text) = raw.strip_prefix("text=") {
    date::DateValue::Text(text.trim().to_string())
  } else {
    match date::parse_date(raw) {
      Ok(v) => v,
      // 4.0 accepts any spelling as a free-text date; 3.0 has no such
      // escape hatch.
      Err(_) if card.version() == Version::V4 => {
        date::DateValue::Text(raw.to_string())
      }
      Err(e) => return Err(Error::Core(e)),
    }
  };
  set(card, parsed);
  Ok(())
}

fn apply_labeled_scalars(
  card: &mut Card,
  doc: &Mapping,
  key: &str,
  raw_name: &str,
  add: fn(&mut Card, &str, &str),
) -> Result<()> {
  let Some(node) = get(doc, key) else {
    return Ok(());
  };
  card.delete_field(raw_name);
  if node.is_null() {
    return Ok(());
  }
  for (label, entry) in as_mapping(node, key)? {
    let label = scalar_to_string(label, key)?;
    let Some(value) = field_value(entry, key)? else {
      continue;
    };
    for item in value.into_list(key)? {
      if !item.trim().is_empty() {
        add(card, &label, &item);
      }
    }
  }
  Ok(())
}

fn address_from_mapping(map: &Mapping, key: &str) -> Result<PostAddress> {
  let part = |sub: &str| -> Result<Vec<String>> {
    let Some(node) = get(map, sub) else {
      return Ok(Vec::new());
    };
    let Some(value) = field_value(node, key)? else {
      return Ok(Vec::new());
    };
    Ok(
      value
        .into_list(key)?
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect(),
    )
  };
  Ok(PostAddress {
    po_box:   part("Box")?,
    extended: part("Extended")?,
    street:   part("Street")?,
    city:     part("City")?,
    region:   part("Region")?,
    code:     part("Code")?,
    country:  part("Country")?,
  })
}

fn apply_addresses(card: &mut Card, doc: &Mapping) -> Result<()> {
  let Some(node) = get(doc, "Address") else {
    return Ok(());
  };
  card.delete_field("ADR");
  if node.is_null() {
    return Ok(());
  }
  for (label, entry) in as_mapping(node, "Address")? {
    let label = scalar_to_string(label, "Address")?;
    let entries: Vec<&Value> = match entry {
      Value::Null => continue,
      Value::Sequence(items) => items.iter().collect(),
      single => vec![single],
    };
    for item in entries {
      let address =
        address_from_mapping(as_mapping(item, "Address")?, "Address")?;
      if address != PostAddress::default() {
        card.add_post_address(&label, address);
      }
    }
  }
  Ok(())
}

fn apply_private(
  card: &mut Card,
  doc: &Mapping,
  private_labels: &[String],
) -> Result<()> {
  let Some(node) = get(doc, "Private") else {
    return Ok(());
  };
  for label in private_labels {
    card.delete_field(&card::private_prop_name(label));
  }
  if node.is_null() {
    return Ok(());
  }
  for (label, entry) in as_mapping(node, "Private")? {
    let label = scalar_to_string(label, "Private")?;
    let Some(value) = field_value(entry, "Private")? else {
      continue;
    };
    for item in value.into_list("Private")? {
      if !item.trim().is_empty() {
        card.add_private_object(private_labels, &label, &item)?;
      }
    }
  }
  Ok(())
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Parse `text` and apply every present section onto `card`.
pub fn update_card(
  card: &mut Card,
  text: &str,
  private_labels: &[String],
) -> Result<()> {
  let doc: Value = serde_yaml::from_str(text)?;
  let doc = doc.as_mapping().ok_or(Error::NotAMapping)?;

  for key in doc.keys() {
    if let Value::String(key) = key {
      if !KNOWN_KEYS.contains(&key.as_str()) {
        warn!(key, "unrecognized document key ignored");
      }
    }
  }

  // Organisations first: the derived display name may fall back to them.
  apply_grouped(card, doc, "Organisation", "ORG", Card::add_organisation)?;
  apply_name(card, doc)?;

  apply_list(card, doc, "Nickname", "NICKNAME", |c, v| c.add_nickname(v))?;
  apply_list(card, doc, "Title", "TITLE", |c, v| c.add_title(v))?;
  apply_list(card, doc, "Role", "ROLE", |c, v| c.add_role(v))?;
  apply_list(card, doc, "Webpage", "URL", |c, v| c.add_webpage(v))?;
  apply_list(card, doc, "Note", "NOTE", |c, v| c.add_note(v))?;
  apply_grouped(card, doc, "Categories", "CATEGORIES", Card::add_category)?;

  apply_date(card, doc, "Birthday", Card::set_birthday, &["BDAY"])?;
  apply_date(card, doc, "Anniversary", Card::set_anniversary, &[
    "ANNIVERSARY",
    "X-ANNIVERSARY",
  ])?;

  apply_labeled_scalars(card, doc, "Phone", "TEL", |c, l, v| {
    c.add_phone_number(l, v)
  })?;
  apply_labeled_scalars(card, doc, "Email", "EMAIL", |c, l, v| {
    c.add_email(l, v)
  })?;
  apply_addresses(card, doc)?;
  apply_private(card, doc, private_labels)?;

  Ok(())
}

/// Build a fresh card of `version` from an edited document.
pub fn card_from_yaml(
  text: &str,
  version: Version,
  private_labels: &[String],
) -> Result<Card> {
  let mut card = Card::new(version);
  update_card(&mut card, text, private_labels)?;
  Ok(card)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use rolo_core::date::DateValue;

  use super::*;

  fn no_private() -> Vec<String> {
    Vec::new()
  }

  #[test]
  fn non_mapping_document_is_rejected() {
    let err =
      card_from_yaml("- just\n- a\n- list\n", Version::V3, &no_private())
        .unwrap_err();
    assert!(matches!(err, Error::NotAMapping));
  }

  #[test]
  fn name_parts_accept_scalar_and_list() {
    let card = card_from_yaml(
      "First name: Jane\nLast name:\n    - von\n    - Doe\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    let name = card.structured_name().unwrap();
    assert_eq!(name.given, vec!["Jane"]);
    assert_eq!(name.family, vec!["von", "Doe"]);
    assert_eq!(card.formatted_name(), "Jane von Doe");
  }

  #[test]
  fn empty_name_still_writes_a_name_record() {
    let card = card_from_yaml(
      "First name:\nLast name:\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    assert_eq!(card.structured_name(), Some(Default::default()));
  }

  #[test]
  fn display_name_falls_back_to_organisation() {
    let card = card_from_yaml(
      "First name:\nOrganisation: Acme Inc.\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    assert_eq!(card.formatted_name(), "Acme Inc.");
  }

  #[test]
  fn phone_labels_map_to_numbers() {
    let card = card_from_yaml(
      "Phone:\n    home: '0123456789'\n    work:\n        - '1111'\n        - '2222'\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    let phones = card.phone_numbers();
    assert_eq!(phones["home"], vec!["0123456789"]);
    assert_eq!(phones["work"], vec!["1111", "2222"]);
  }

  #[test]
  fn unquoted_numeric_phone_survives() {
    let card = card_from_yaml(
      "Phone:\n    cell: 123456789\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    assert_eq!(card.phone_numbers()["cell"], vec!["123456789"]);
  }

  #[test]
  fn custom_phone_label_round_trips_through_ablabel() {
    let card = card_from_yaml(
      "Phone:\n    custom_type: '1234'\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    assert_eq!(card.phone_numbers()["custom_type"], vec!["1234"]);
  }

  #[test]
  fn addresses_accept_single_mapping() {
    let card = card_from_yaml(
      "Address:\n    home:\n        Street: Main Street 1\n        City: Springfield\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    let addresses = card.post_addresses();
    let home = &addresses["home"][0];
    assert_eq!(home.street, vec!["Main Street 1"]);
    assert_eq!(home.city, vec!["Springfield"]);
  }

  #[test]
  fn addresses_accept_sequence_of_mappings() {
    let card = card_from_yaml(
      "Address:\n    home:\n        - Street: First 1\n        - Street: Second 2\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    assert_eq!(card.post_addresses()["home"].len(), 2);
  }

  #[test]
  fn birthday_parses_dates_and_text_prefix() {
    let card = card_from_yaml(
      "Birthday: 1990-01-20\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    assert_eq!(
      card.birthday(),
      Some(DateValue::Date(
        NaiveDate::from_ymd_opt(1990, 1, 20).unwrap()
      ))
    );

    let card = card_from_yaml(
      "Birthday: text=circa 1800\n",
      Version::V4,
      &no_private(),
    )
    .unwrap();
    assert_eq!(card.birthday(), Some(DateValue::Text("circa 1800".into())));
  }

  #[test]
  fn undecodable_birthday_is_an_error_under_v3() {
    let err = card_from_yaml(
      "Birthday: sometime in spring\n",
      Version::V3,
      &no_private(),
    )
    .unwrap_err();
    assert!(matches!(
      err,
      Error::Core(rolo_core::Error::DateParseFailure(_))
    ));
  }

  #[test]
  fn undecodable_birthday_becomes_text_under_v4() {
    let card = card_from_yaml(
      "Birthday: sometime in spring\n",
      Version::V4,
      &no_private(),
    )
    .unwrap();
    assert_eq!(
      card.birthday(),
      Some(DateValue::Text("sometime in spring".into()))
    );
  }

  #[test]
  fn private_fields_require_configuration() {
    let labels = vec!["Jabber".to_string()];
    let card = card_from_yaml(
      "Private:\n    Jabber: jane@example.org\n",
      Version::V3,
      &labels,
    )
    .unwrap();
    assert_eq!(
      card.private_objects(&labels)["Jabber"],
      vec!["jane@example.org"]
    );

    let err = card_from_yaml(
      "Private:\n    Twitter: '@jane'\n",
      Version::V3,
      &no_private(),
    )
    .unwrap_err();
    assert!(matches!(
      err,
      Error::Core(rolo_core::Error::UnknownPrivateField(label))
        if label == "Twitter"
    ));
  }

  #[test]
  fn present_sections_replace_existing_fields() {
    let mut card = Card::new(Version::V3);
    card.add_nickname("old");
    card.add_nickname("older");
    update_card(&mut card, "Nickname: fresh\n", &no_private()).unwrap();
    assert_eq!(card.nicknames(), vec!["fresh"]);
  }

  #[test]
  fn absent_sections_leave_the_card_alone() {
    let mut card = Card::new(Version::V3);
    card.add_nickname("kept");
    update_card(&mut card, "Note: hello\n", &no_private()).unwrap();
    assert_eq!(card.nicknames(), vec!["kept"]);
    assert_eq!(card.notes(), vec!["hello"]);
  }

  #[test]
  fn explicit_null_section_clears_the_field() {
    let mut card = Card::new(Version::V3);
    card.add_nickname("old");
    update_card(&mut card, "Nickname:\n", &no_private()).unwrap();
    assert!(card.nicknames().is_empty());
  }

  #[test]
  fn organisations_accept_nested_units() {
    let card = card_from_yaml(
      "Organisation:\n    - Acme Inc.\n    -\n        - Big Corp\n        - Research\n",
      Version::V3,
      &no_private(),
    )
    .unwrap();
    assert_eq!(card.organisations(), vec![
      vec!["Acme Inc.".to_string()],
      vec!["Big Corp".to_string(), "Research".to_string()],
    ]);
  }
}
