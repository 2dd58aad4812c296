//! Date-like values and their textual encodings.
//!
//! Birthday and anniversary fields accept a calendar date, a date with a
//! time of day, or (vCard 4.0 only) free text. The textual encodings are
//! the vCard date families; decoding tries each family in a fixed order and
//! the first match wins.
//!
//! Encoding a date-time needs a UTC offset. That offset is always passed in
//! by the caller so the codec stays deterministic; [`local_offset`] is the
//! convenience for production callers.

use chrono::{
  DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Placeholder year meaning "no year known"; such dates encode to the
/// partial `--MM-DD` form.
pub const NO_YEAR: i32 = 1900;

/// A birthday-like value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
  Date(NaiveDate),
  DateTime(NaiveDateTime),
  /// Free-text value; legal under vCard 4.0 only.
  Text(String),
}

/// The process-local UTC offset at call time.
pub fn local_offset() -> FixedOffset {
  Local::now().offset().fix()
}

/// Parse `input` against the date and date-time format families.
///
/// Tried in order: `--MMDD`, `--MM-DD`, `YYYYMMDD`, `YYYY-MM-DD`,
/// `YYYYMMDDTHHMMSS[Z]`, `YYYY-MM-DDTHH:MM:SS[Z]`, then the
/// offset-suffixed variants with the final colon of the offset stripped
/// before parsing. First match wins.
pub fn parse_date(input: &str) -> Result<DateValue> {
  let input = input.trim();

  // Year-omitted partial dates take the placeholder year.
  if let Some(rest) = input.strip_prefix("--") {
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{NO_YEAR}{rest}"), "%Y%m%d")
    {
      return Ok(DateValue::Date(d));
    }
    if let Ok(d) =
      NaiveDate::parse_from_str(&format!("{NO_YEAR}-{rest}"), "%Y-%m-%d")
    {
      return Ok(DateValue::Date(d));
    }
  }

  for fmt in ["%Y%m%d", "%Y-%m-%d"] {
    if let Ok(d) = NaiveDate::parse_from_str(input, fmt) {
      return Ok(DateValue::Date(d));
    }
  }

  for fmt in [
    "%Y%m%dT%H%M%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y%m%dT%H%M%SZ",
    "%Y-%m-%dT%H:%M:%SZ",
  ] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
      return Ok(DateValue::DateTime(dt));
    }
  }

  // Offset-suffixed variants: a trailing `±HH:MM` loses its colon first,
  // so the same `%z` specifier covers `+0200` and `+02:00` inputs alike.
  let bytes = input.as_bytes();
  let mut squashed = input.to_string();
  if bytes.len() >= 6
    && bytes[bytes.len() - 3] == b':'
    && matches!(bytes[bytes.len() - 6], b'+' | b'-')
  {
    squashed.remove(bytes.len() - 3);
  }
  for fmt in ["%Y%m%dT%H%M%S%z", "%Y-%m-%dT%H:%M:%S%z"] {
    if let Ok(dt) = DateTime::parse_from_str(&squashed, fmt) {
      return Ok(DateValue::DateTime(dt.naive_local()));
    }
  }

  Err(Error::DateParseFailure(input.to_string()))
}

/// Encode `value` as vCard date text.
///
/// Free text passes through unchanged. A date-time with a non-midnight
/// time renders as `YYYY-MM-DDTHH:MM:SS±HH:MM` using `offset` (the offset
/// is dropped when `omit_offset`). A date whose year is the [`NO_YEAR`]
/// placeholder renders as `--MM-DD`; anything else as `YYYY-MM-DD`.
pub fn format_date(
  value: &DateValue,
  offset: FixedOffset,
  omit_offset: bool,
) -> String {
  match value {
    DateValue::Text(s) => s.clone(),
    DateValue::DateTime(dt) if dt.time() != NaiveTime::MIN => {
      if omit_offset {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
      } else {
        format!("{}{}", dt.format("%Y-%m-%dT%H:%M:%S"), offset)
      }
    }
    DateValue::DateTime(dt) => format_plain_date(dt.date()),
    DateValue::Date(d) => format_plain_date(*d),
  }
}

fn format_plain_date(d: NaiveDate) -> String {
  use chrono::Datelike;
  if d.year() == NO_YEAR {
    d.format("--%m-%d").to_string()
  } else {
    d.format("%Y-%m-%d").to_string()
  }
}
