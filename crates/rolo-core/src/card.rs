//! The Card — a normalized, queryable view over a vCard property tree.
//!
//! A card owns its backing [`Property`] list exclusively. Mutators append
//! or replace raw properties; accessors return canonical, sorted views and
//! never change storage order. Duplicates are preserved on add and end up
//! adjacent after sorting.

use std::collections::BTreeMap;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
  Result,
  date::{self, DateValue},
  label::{self, FieldKind},
  property::Property,
  shape::FieldValue,
  version::Version,
};

// ─── Typed sub-records ───────────────────────────────────────────────────────

/// The components of an `N` record. Each part is a list to support multiple
/// name components (`given1 given2`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredName {
  pub prefix:     Vec<String>,
  pub given:      Vec<String>,
  pub additional: Vec<String>,
  pub family:     Vec<String>,
  pub suffix:     Vec<String>,
}

/// One post address (`ADR` record). Component order on the wire is
/// box;extended;street;city;region;code;country.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize,
  Deserialize,
)]
pub struct PostAddress {
  pub po_box:   Vec<String>,
  pub extended: Vec<String>,
  pub street:   Vec<String>,
  pub city:     Vec<String>,
  pub region:   Vec<String>,
  pub code:     Vec<String>,
  pub country:  Vec<String>,
}

// ─── Card ────────────────────────────────────────────────────────────────────

/// An in-memory contact record.
#[derive(Debug, Clone)]
pub struct Card {
  version:    Version,
  /// UTC offset used when encoding date-times; injected so that tests are
  /// deterministic.
  utc_offset: FixedOffset,
  props:      Vec<Property>,
}

impl Card {
  /// An empty card of the given version with a fresh `UID`.
  pub fn new(version: Version) -> Self {
    let mut card = Card {
      version,
      utc_offset: date::local_offset(),
      props: Vec::new(),
    };
    card.props.push(Property::text("VERSION", version.as_str()));
    card
      .props
      .push(Property::text("UID", Uuid::new_v4().simple().to_string()));
    card
  }

  /// Wrap an existing property tree.
  ///
  /// A missing or unsupported `VERSION` is recovered by defaulting to
  /// vCard 3.0 with a warning; it is never a hard error.
  pub fn from_properties(props: Vec<Property>) -> Self {
    let mut card = Card {
      version: Version::default(),
      utc_offset: date::local_offset(),
      props,
    };
    match card.first_value("VERSION").map(str::to_string) {
      None => {
        warn!(
          fallback = Version::default().as_str(),
          "vCard has no VERSION, assuming the default"
        );
        card.set_version(Version::default());
      }
      Some(raw) => match Version::parse(&raw) {
        Some(v) => card.version = v,
        None => {
          warn!(
            version = raw.as_str(),
            fallback = Version::default().as_str(),
            "unsupported vCard version, falling back to the default"
          );
          card.set_version(Version::default());
        }
      },
    }
    card
  }

  pub fn version(&self) -> Version {
    self.version
  }

  pub fn set_version(&mut self, version: Version) {
    self.version = version;
    self.props.retain(|p| p.name != "VERSION");
    self
      .props
      .insert(0, Property::text("VERSION", version.as_str()));
  }

  /// Override the UTC offset used for date-time encoding.
  pub fn set_utc_offset(&mut self, offset: FixedOffset) {
    self.utc_offset = offset;
  }

  /// The UTC offset used for date-time encoding.
  pub fn utc_offset(&self) -> FixedOffset {
    self.utc_offset
  }

  /// The backing property tree, in storage order.
  pub fn properties(&self) -> &[Property] {
    &self.props
  }

  pub fn push(&mut self, prop: Property) {
    self.props.push(prop);
  }

  // ── Raw-field plumbing ───────────────────────────────────────────────────

  fn props_named<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Iterator<Item = &'a Property> {
    self.props.iter().filter(move |p| p.name.eq_ignore_ascii_case(name))
  }

  fn first_value<'a>(&'a self, name: &'a str) -> Option<&'a str> {
    self.props_named(name).next().map(Property::as_text)
  }

  /// Remove every occurrence of the raw field `name`, along with any
  /// `X-ABLABEL` annotation sharing a removed occurrence's group. No-op
  /// when the field does not exist.
  pub fn delete_field(&mut self, name: &str) {
    let name = name.to_uppercase();
    let groups: Vec<String> = self
      .props
      .iter()
      .filter(|p| p.name == name)
      .filter_map(|p| p.group.clone())
      .collect();
    self.props.retain(|p| p.name != name);
    self.props.retain(|p| {
      !(p.name == "X-ABLABEL"
        && p.group.as_ref().is_some_and(|g| groups.contains(g)))
    });
  }

  /// All values of a scalar-or-list field, flattened and sorted.
  fn sorted_values(&self, name: &str) -> Vec<String> {
    let mut out: Vec<String> = self
      .props_named(name)
      .flat_map(|p| p.components.iter().flatten())
      .filter(|s| !s.is_empty())
      .cloned()
      .collect();
    out.sort();
    out
  }

  /// The smallest unused `itemN` group name.
  fn next_item_group(&self) -> String {
    let mut n = 1usize;
    loop {
      let group = format!("item{n}");
      if !self
        .props
        .iter()
        .any(|p| p.group.as_deref() == Some(group.as_str()))
      {
        return group;
      }
      n += 1;
    }
  }

  // ── Display name ─────────────────────────────────────────────────────────

  /// The formatted display name (`FN`); empty string when absent.
  pub fn formatted_name(&self) -> String {
    self.first_value("FN").unwrap_or_default().to_string()
  }

  /// Set the display name, replacing any prior occurrence; exactly one
  /// `FN` exists per card.
  pub fn set_formatted_name(&mut self, name: &str) {
    self.delete_field("FN");
    self.push(Property::text("FN", name.trim()));
  }

  pub fn uid(&self) -> Option<&str> {
    self.first_value("UID")
  }

  // ── Structured name ──────────────────────────────────────────────────────

  /// Add an `N` record. Every part accepts a scalar or a list; empty
  /// strings are dropped, and a fully empty name is still stored as a
  /// present-but-empty record.
  pub fn add_name(
    &mut self,
    prefix: FieldValue,
    given: FieldValue,
    additional: FieldValue,
    family: FieldValue,
    suffix: FieldValue,
  ) -> Result<()> {
    let clean = |v: FieldValue, field: &str| -> Result<Vec<String>> {
      Ok(
        v.into_list(field)?
          .into_iter()
          .map(|s| s.trim().to_string())
          .filter(|s| !s.is_empty())
          .collect(),
      )
    };
    let mut prop = Property::new("N");
    prop.components = vec![
      clean(family, "Last name")?,
      clean(given, "First name")?,
      clean(additional, "Additional")?,
      clean(prefix, "Prefix")?,
      clean(suffix, "Suffix")?,
    ];
    self.push(prop);
    Ok(())
  }

  /// The first `N` record, if any.
  pub fn structured_name(&self) -> Option<StructuredName> {
    let prop = self.props_named("N").next()?;
    let part = |i: usize| -> Vec<String> {
      prop
        .component(i)
        .iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect()
    };
    Some(StructuredName {
      family:     part(0),
      given:      part(1),
      additional: part(2),
      prefix:     part(3),
      suffix:     part(4),
    })
  }

  /// Derived "first-last" ordering: given + additional + family, space
  /// joined. Falls back to the display name when no usable name parts
  /// exist.
  pub fn first_name_last_name(&self) -> String {
    let Some(name) = self.structured_name() else {
      return self.formatted_name();
    };
    let parts: Vec<&str> = name
      .given
      .iter()
      .chain(&name.additional)
      .chain(&name.family)
      .map(String::as_str)
      .collect();
    if parts.is_empty() {
      self.formatted_name()
    } else {
      parts.join(" ")
    }
  }

  /// Derived "last-first" ordering: family, then `", "`, then given +
  /// additional. Falls back like [`Card::first_name_last_name`].
  pub fn last_name_first_name(&self) -> String {
    let Some(name) = self.structured_name() else {
      return self.formatted_name();
    };
    let family = name.family.join(" ");
    let given: Vec<&str> = name
      .given
      .iter()
      .chain(&name.additional)
      .map(String::as_str)
      .collect();
    let given = given.join(" ");
    match (family.is_empty(), given.is_empty()) {
      (false, false) => format!("{family}, {given}"),
      (false, true) => family,
      (true, false) => given,
      (true, true) => self.formatted_name(),
    }
  }

  // ── Scalar-or-list fields ────────────────────────────────────────────────

  pub fn nicknames(&self) -> Vec<String> {
    self.sorted_values("NICKNAME")
  }

  pub fn add_nickname(&mut self, nick: &str) {
    self.push(Property::text("NICKNAME", nick.trim()));
  }

  pub fn titles(&self) -> Vec<String> {
    self.sorted_values("TITLE")
  }

  pub fn add_title(&mut self, title: &str) {
    self.push(Property::text("TITLE", title.trim()));
  }

  pub fn roles(&self) -> Vec<String> {
    self.sorted_values("ROLE")
  }

  pub fn add_role(&mut self, role: &str) {
    self.push(Property::text("ROLE", role.trim()));
  }

  pub fn webpages(&self) -> Vec<String> {
    self.sorted_values("URL")
  }

  pub fn add_webpage(&mut self, url: &str) {
    self.push(Property::text("URL", url.trim()));
  }

  /// Notes keep embedded newlines; only surrounding whitespace is trimmed.
  pub fn notes(&self) -> Vec<String> {
    self.sorted_values("NOTE")
  }

  pub fn add_note(&mut self, note: &str) {
    self.push(Property::text("NOTE", note.trim()));
  }

  // ── Grouped fields ───────────────────────────────────────────────────────

  /// Organisation paths (company, unit, sub-unit, …), sorted.
  pub fn organisations(&self) -> Vec<Vec<String>> {
    let mut orgs: Vec<Vec<String>> = self
      .props_named("ORG")
      .map(|p| {
        p.components
          .iter()
          .flatten()
          .filter(|s| !s.is_empty())
          .cloned()
          .collect::<Vec<String>>()
      })
      .filter(|units| !units.is_empty())
      .collect();
    orgs.sort();
    orgs
  }

  pub fn add_organisation(&mut self, units: Vec<String>) {
    let mut prop = Property::new("ORG");
    prop.components = units.into_iter().map(|u| vec![u]).collect();
    self.push(prop);
  }

  /// Category groups, sorted; each group's internal order is preserved.
  pub fn categories(&self) -> Vec<Vec<String>> {
    let mut cats: Vec<Vec<String>> = self
      .props_named("CATEGORIES")
      .map(|p| {
        p.as_list()
          .iter()
          .filter(|s| !s.is_empty())
          .cloned()
          .collect::<Vec<String>>()
      })
      .filter(|group| !group.is_empty())
      .collect();
    cats.sort();
    cats
  }

  pub fn add_category(&mut self, categories: Vec<String>) {
    let mut prop = Property::new("CATEGORIES");
    prop.components = vec![categories];
    self.push(prop);
  }

  // ── Labeled collections ──────────────────────────────────────────────────

  fn add_labeled(
    &mut self,
    kind: FieldKind,
    name: &str,
    raw_label: &str,
    components: Vec<Vec<String>>,
  ) {
    let mut tokens = label::tokens(raw_label);
    label::sort_tokens(&mut tokens);
    let mut prop = Property::new(name);
    prop.components = components;
    if label::is_custom(&tokens, kind, self.version) {
      // Custom labels travel as a grouped X-ABLABEL side-record.
      let group = self.next_item_group();
      prop.group = Some(group.clone());
      self.push(prop);
      let mut ablabel = Property::text("X-ABLABEL", tokens.join(", "));
      ablabel.group = Some(group);
      self.push(ablabel);
    } else {
      for t in &tokens {
        prop.set_param("TYPE", t.clone());
      }
      self.push(prop);
    }
  }

  /// The normalized label of a labeled property: a grouped `X-ABLABEL`
  /// wins, then `TYPE` parameters, then the per-kind default.
  fn label_of(&self, prop: &Property, default: &str) -> String {
    if let Some(group) = prop.group.as_deref() {
      let ablabel = self.props.iter().find(|p| {
        p.name == "X-ABLABEL" && p.group.as_deref() == Some(group)
      });
      if let Some(p) = ablabel {
        let text = p.as_text();
        if !text.is_empty() {
          return text.to_string();
        }
      }
    }
    let types = prop.param_values("TYPE");
    if types.is_empty() {
      default.to_string()
    } else {
      label::normalize(&types.join(","))
    }
  }

  pub fn phone_numbers(&self) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for prop in self.props_named("TEL") {
      let value = prop.as_text();
      if value.is_empty() {
        continue;
      }
      map
        .entry(self.label_of(prop, "voice"))
        .or_default()
        .push(value.to_string());
    }
    for numbers in map.values_mut() {
      numbers.sort();
    }
    map
  }

  pub fn add_phone_number(&mut self, label: &str, number: &str) {
    self.add_labeled(
      FieldKind::Phone,
      "TEL",
      label,
      vec![vec![number.trim().to_string()]],
    );
  }

  pub fn emails(&self) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for prop in self.props_named("EMAIL") {
      let value = prop.as_text();
      if value.is_empty() {
        continue;
      }
      map
        .entry(self.label_of(prop, "internet"))
        .or_default()
        .push(value.to_string());
    }
    for addresses in map.values_mut() {
      addresses.sort();
    }
    map
  }

  pub fn add_email(&mut self, label: &str, address: &str) {
    self.add_labeled(
      FieldKind::Email,
      "EMAIL",
      label,
      vec![vec![address.trim().to_string()]],
    );
  }

  pub fn post_addresses(&self) -> BTreeMap<String, Vec<PostAddress>> {
    let mut map: BTreeMap<String, Vec<PostAddress>> = BTreeMap::new();
    for prop in self.props_named("ADR") {
      let part = |i: usize| -> Vec<String> {
        prop
          .component(i)
          .iter()
          .filter(|s| !s.is_empty())
          .cloned()
          .collect()
      };
      let address = PostAddress {
        po_box:   part(0),
        extended: part(1),
        street:   part(2),
        city:     part(3),
        region:   part(4),
        code:     part(5),
        country:  part(6),
      };
      if address == PostAddress::default() {
        continue;
      }
      map
        .entry(self.label_of(prop, "home"))
        .or_default()
        .push(address);
    }
    for addresses in map.values_mut() {
      addresses.sort();
    }
    map
  }

  pub fn add_post_address(&mut self, label: &str, address: PostAddress) {
    let components = vec![
      address.po_box,
      address.extended,
      address.street,
      address.city,
      address.region,
      address.code,
      address.country,
    ];
    self.add_labeled(FieldKind::Address, "ADR", label, components);
  }

  // ── Birthday-like fields ─────────────────────────────────────────────────

  pub fn birthday(&self) -> Option<DateValue> {
    self.date_field("BDAY")
  }

  pub fn set_birthday(&mut self, value: DateValue) {
    self.set_date_field("BDAY", value);
  }

  pub fn anniversary(&self) -> Option<DateValue> {
    self
      .date_field("ANNIVERSARY")
      .or_else(|| self.date_field("X-ANNIVERSARY"))
  }

  pub fn set_anniversary(&mut self, value: DateValue) {
    // vCard 3.0 has no ANNIVERSARY property; the X- variant is the
    // conventional carrier there.
    let name = match self.version {
      Version::V3 => "X-ANNIVERSARY",
      Version::V4 => "ANNIVERSARY",
    };
    self.set_date_field(name, value);
  }

  fn date_field(&self, name: &str) -> Option<DateValue> {
    let raw = self.first_value(name)?;
    if raw.is_empty() {
      return None;
    }
    match date::parse_date(raw) {
      Ok(value) => Some(value),
      // Under 4.0 an undecodable value is a legal free-text date.
      Err(_) if self.version == Version::V4 => {
        Some(DateValue::Text(raw.to_string()))
      }
      Err(_) => {
        warn!(field = name, value = raw, "undecodable date value ignored");
        None
      }
    }
  }

  fn set_date_field(&mut self, name: &str, value: DateValue) {
    if matches!(value, DateValue::Text(_)) && self.version == Version::V3 {
      warn!(
        field = name,
        "free-text dates require vCard 4.0, leaving the field unset"
      );
      return;
    }
    self.delete_field(name);
    let mut prop =
      Property::text(name, date::format_date(&value, self.utc_offset, false));
    if matches!(value, DateValue::Text(_)) {
      prop.set_param("VALUE", "text");
    }
    self.push(prop);
  }

  // ── Private extension fields ─────────────────────────────────────────────

  /// Values of the configured private fields, keyed by their configured
  /// label spelling.
  pub fn private_objects(
    &self,
    supported: &[String],
  ) -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    for want in supported {
      let mut values: Vec<String> = self
        .props_named(&private_prop_name(want))
        .map(|p| p.as_text().to_string())
        .filter(|s| !s.is_empty())
        .collect();
      if !values.is_empty() {
        values.sort();
        map.insert(want.clone(), values);
      }
    }
    map
  }

  /// Add a private field occurrence. The label must match one of the
  /// configured labels (case-insensitive).
  pub fn add_private_object(
    &mut self,
    supported: &[String],
    label: &str,
    value: &str,
  ) -> Result<()> {
    let canonical = supported
      .iter()
      .find(|s| s.eq_ignore_ascii_case(label))
      .ok_or_else(|| crate::Error::UnknownPrivateField(label.to_string()))?;
    self.push(Property::text(&private_prop_name(canonical), value.trim()));
    Ok(())
  }
}

/// The raw property name carrying the private field `label`.
pub fn private_prop_name(label: &str) -> String {
  format!("X-{}", label.to_uppercase().replace(' ', "-"))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
