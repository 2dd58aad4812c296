//! vCard 3.0 / 4.0 codec for rolo.
//!
//! Converts between vCard text and [`rolo_core::Card`]. Pure synchronous;
//! no file or network dependencies. The codec builds a card's property
//! tree within a single call and never retains a reference to it.
//!
//! # Quick start
//!
//! ```no_run
//! let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Alice Smith\r\nEND:VCARD\r\n";
//! let card = rolo_vcard::parse(input).unwrap();
//! println!("{}", card.formatted_name());
//! ```

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};
use rolo_core::Card;

/// Parse a single vCard from `input`.
pub fn parse(input: &str) -> Result<Card> {
  parse::parse_one(input)
}

/// Parse zero or more vCards from `input`.
///
/// Each `BEGIN:VCARD … END:VCARD` block is parsed independently; a
/// malformed block yields `Err(…)` in the corresponding position without
/// aborting the rest.
pub fn parse_many(input: &str) -> Vec<Result<Card>> {
  let lines = parse::unfold_lines(input);
  let mut results = Vec::new();
  let mut i = 0;

  while i < lines.len() {
    if lines[i].eq_ignore_ascii_case("BEGIN:VCARD") {
      let start = i;
      let rel_end = lines[start + 1..]
        .iter()
        .position(|l| l.eq_ignore_ascii_case("END:VCARD"));

      if let Some(offset) = rel_end {
        let end = start + 1 + offset;
        let card_str = lines[start..=end].join("\r\n") + "\r\n";
        results.push(parse::parse_one(&card_str));
        i = end + 1;
      } else {
        results.push(Err(Error::MissingEnvelope));
        break;
      }
    } else {
      i += 1;
    }
  }

  results
}

/// Serialize `card` as vCard text in its own format version.
pub fn serialize(card: &Card) -> String {
  serialize::serialize(card)
}

// ─── Round-trip tests ────────────────────────────────────────────────────────
