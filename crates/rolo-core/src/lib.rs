//! Core types for the rolo address book.
//!
//! A contact is a [`Card`]: a normalized view over a generic vCard property
//! tree. The card owns its tree exclusively; codec crates build or walk it
//! within a single call and never retain a reference.
//!
//! This crate is deliberately free of I/O: no files, no network, no editor.
//! The vCard text codec lives in `rolo-vcard` and the human-editable YAML
//! document in `rolo-yaml`.

pub mod card;
pub mod date;
pub mod error;
pub mod label;
pub mod property;
pub mod shape;
pub mod version;

pub use card::{Card, PostAddress, StructuredName};
pub use error::{Error, Result};
pub use property::Property;
pub use shape::FieldValue;
pub use version::Version;
