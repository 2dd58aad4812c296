//! The blank document offered when creating a contact from scratch.

use rolo_core::{
  Version,
  label::{FieldKind, known_labels},
};

/// A commented skeleton of every editable section, in the same order the
/// emitter uses. The supported-type hints match `version`; the private
/// section lists each configured label.
pub fn new_contact_template(
  version: Version,
  private_labels: &[String],
) -> String {
  let types = |kind: FieldKind| known_labels(kind, version).join(", ");
  let mut lines = vec![
    "# name components".to_string(),
    "# every entry accepts a single value or a list of values".to_string(),
    "Prefix      : ".to_string(),
    "First name  : ".to_string(),
    "Additional  : ".to_string(),
    "Last name   : ".to_string(),
    "Suffix      : ".to_string(),
    String::new(),
    "# nickname".to_string(),
    "Nickname    : ".to_string(),
    String::new(),
    "# important dates".to_string(),
    "# accepted: yyyy-mm-dd, yyyy-mm-ddTHH:MM:SS, --mm-dd".to_string(),
    "# a free-form value needs the text= prefix and vCard 4.0".to_string(),
    "Anniversary : ".to_string(),
    "Birthday    : ".to_string(),
    String::new(),
    "# organisation: a single company or a nested list of units".to_string(),
    "Organisation: ".to_string(),
    String::new(),
    "# job".to_string(),
    "Title       : ".to_string(),
    "Role        : ".to_string(),
    String::new(),
    format!("# phone numbers, by label ({})", types(FieldKind::Phone)),
    "# any other single word becomes a custom label".to_string(),
    "Phone       : ".to_string(),
    "    cell: ".to_string(),
    "    home: ".to_string(),
    String::new(),
    format!("# email addresses, by label ({})", types(FieldKind::Email)),
    "Email       : ".to_string(),
    "    home: ".to_string(),
    "    work: ".to_string(),
    String::new(),
    format!("# post addresses, by label ({})", types(FieldKind::Address)),
    "Address     : ".to_string(),
    "    home: ".to_string(),
    "        Box     : ".to_string(),
    "        Extended: ".to_string(),
    "        Street  : ".to_string(),
    "        Code    : ".to_string(),
    "        City    : ".to_string(),
    "        Region  : ".to_string(),
    "        Country : ".to_string(),
    String::new(),
    "# categories".to_string(),
    "Categories  : ".to_string(),
    String::new(),
    "# web pages".to_string(),
    "Webpage     : ".to_string(),
    String::new(),
  ];

  lines.push("# configured private fields".to_string());
  lines.push("Private     : ".to_string());
  let longest = private_labels.iter().map(String::len).max().unwrap_or(0);
  for label in private_labels {
    lines.push(format!(
      "    {label}{}: ",
      " ".repeat(longest - label.len())
    ));
  }
  lines.push(String::new());

  lines.push("# notes, multi-line values start with |".to_string());
  lines.push("Note        : ".to_string());

  lines.join("\n") + "\n"
}
