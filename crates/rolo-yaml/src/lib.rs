//! Human-editable YAML documents for contact cards.
//!
//! A card renders to a fixed-order, deterministic document via
//! [`to_yaml`]; an edited document applies back with [`update_card`] or
//! builds a fresh card with [`card_from_yaml`]. [`new_contact_template`]
//! produces the commented skeleton used when creating a contact from
//! scratch.
//!
//! Emit and parse are inverses up to normalization: rendering a card and
//! applying the result to a blank card of the same version reproduces
//! every editable field.

mod emit;
mod error;
mod parse;
mod template;

pub use emit::to_yaml;
pub use error::{Error, Result};
pub use parse::{card_from_yaml, update_card};
pub use template::new_contact_template;
