//! vCard 3.0 / 4.0 serializer.
//!
//! Produces CRLF line endings and folds at 75 octets per RFC 6350 §3.2.
//! Properties are emitted in the card's storage order, after the envelope
//! and `VERSION` lines.

use rolo_core::{Card, Property};

// ─── RFC 6350 line folding ───────────────────────────────────────────────────

/// Emit `s` as one logical line, folding at 75 octets with CRLF + SP
/// continuation.
pub(crate) fn fold_line(s: &str) -> String {
  if s.len() <= 75 {
    return format!("{}\r\n", s);
  }

  let mut result = String::new();
  let total = s.len();
  let mut pos = 0usize;
  let mut first = true;

  while pos < total {
    let limit = if first { 75 } else { 74 };
    let end = if pos + limit >= total {
      total
    } else {
      // Walk back to the nearest valid UTF-8 char boundary
      let mut e = pos + limit;
      while e > pos && !s.is_char_boundary(e) {
        e -= 1;
      }
      // Guarantee at least one byte per segment
      if e == pos { pos + 1 } else { e }
    };

    if !first {
      result.push(' ');
    }
    result.push_str(&s[pos..end]);
    result.push_str("\r\n");
    pos = end;
    first = false;
  }

  result
}

// ─── Escaping ────────────────────────────────────────────────────────────────

/// Escape one value: `\`, `,`, `;`, `\n`. Every individual value is escaped
/// the same way; component and list separators are only ever the unescaped
/// `;` and `,` inserted between values.
fn escape_value(s: &str) -> String {
  s.replace('\\', "\\\\")
    .replace(',', "\\,")
    .replace(';', "\\;")
    .replace('\n', "\\n")
}

/// Quote a parameter value when it would be ambiguous bare.
fn param_value_str(s: &str) -> String {
  if s.contains([';', ',', ':']) {
    format!("\"{s}\"")
  } else {
    s.to_string()
  }
}

// ─── Content-line assembly ───────────────────────────────────────────────────

fn property_line(prop: &Property) -> String {
  let mut line = String::new();
  if let Some(group) = &prop.group {
    line.push_str(group);
    line.push('.');
  }
  line.push_str(&prop.name);

  // Consecutive values of the same parameter collapse into one
  // comma-joined entry (TYPE=home,pref).
  let mut i = 0;
  while i < prop.params.len() {
    let (name, _) = &prop.params[i];
    let values: Vec<String> = prop.params[i..]
      .iter()
      .take_while(|(n, _)| n == name)
      .map(|(_, v)| param_value_str(v))
      .collect();
    line.push(';');
    line.push_str(name);
    line.push('=');
    line.push_str(&values.join(","));
    i += values.len();
  }

  line.push(':');
  let value = prop
    .components
    .iter()
    .map(|component| {
      component
        .iter()
        .map(|v| escape_value(v))
        .collect::<Vec<_>>()
        .join(",")
    })
    .collect::<Vec<_>>()
    .join(";");
  line.push_str(&value);
  line
}

/// Serialize `card` as vCard text.
pub fn serialize(card: &Card) -> String {
  let mut out = String::new();
  out.push_str("BEGIN:VCARD\r\n");
  out.push_str(&format!("VERSION:{}\r\n", card.version()));
  for prop in card.properties() {
    if prop.name == "VERSION" {
      continue;
    }
    out.push_str(&fold_line(&property_line(prop)));
  }
  out.push_str("END:VCARD\r\n");
  out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
