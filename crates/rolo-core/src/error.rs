//! Error types for `rolo-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An unknown or missing format version. Card construction recovers from
  /// this by defaulting; the variant exists for callers that want to be
  /// strict.
  #[error("unsupported vCard version: {0:?}")]
  UnsupportedVersion(String),

  /// A value that is illegal for the card's format version, e.g. a
  /// free-text birthday under vCard 3.0.
  #[error("invalid value for {field}: {reason}")]
  InvalidFieldValue { field: String, reason: String },

  /// Input whose structure fits no legal shape for the field, e.g. a list
  /// mixing scalars and sub-lists where a group is expected.
  #[error("field {field:?} has a malformed structure")]
  MalformedShape { field: String },

  /// No date or date-time format family matched.
  #[error("no date format matched {0:?}")]
  DateParseFailure(String),

  /// A private field label that is not in the configured label list.
  #[error("unknown private field {0:?}")]
  UnknownPrivateField(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
