use chrono::{DateTime, Utc};
use serde::Deserialize;

use monobump_core::RawChange;

use crate::MAX_INPUT_SIZE;
use crate::error::{FormatError, ValidationError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonChange {
    #[serde(default)]
    package_name: String,
    #[serde(rename = "type")]
    change_type: String,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    dependent_change_type: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonChangeFile {
    Grouped { changes: Vec<JsonChange> },
    Single(JsonChange),
}

/// Parses a JSON change file holding one change object or a
/// `{ "changes": [...] }` list.
///
/// # Errors
///
/// Returns a `FormatError` for invalid JSON, oversized input, an empty list
/// or an entry without a package name.
#[must_use = "parsing result should be handled"]
pub fn parse_json_change_file(source: &str, content: &str) -> Result<Vec<RawChange>, FormatError> {
    if content.len() > MAX_INPUT_SIZE {
        return Err(ValidationError::InputTooLarge {
            max_bytes: MAX_INPUT_SIZE,
        }
        .into());
    }

    let entries = match serde_json::from_str::<JsonChangeFile>(content)? {
        JsonChangeFile::Grouped { changes } => changes,
        JsonChangeFile::Single(change) => vec![change],
    };

    if entries.is_empty() {
        return Err(ValidationError::NoChanges.into());
    }

    entries
        .into_iter()
        .map(|entry| {
            if entry.package_name.trim().is_empty() {
                return Err(ValidationError::MissingPackageName.into());
            }
            let mut change = RawChange::new(
                source,
                entry.package_name,
                entry.change_type,
                entry.comment.trim(),
            );
            change.dependent_change_type = entry.dependent_change_type;
            change.timestamp = entry.date;
            Ok(change)
        })
        .collect()
}
