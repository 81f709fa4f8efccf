use indexmap::IndexMap;
use serde::Deserialize;
use serde_with::{MapPreventDuplicates, serde_as};

use monobump_core::RawChange;

use crate::MAX_INPUT_SIZE;
use crate::error::{FormatError, FrontMatterError, ValidationError};

pub(crate) const FRONT_MATTER_DELIMITER: &str = "---";

#[derive(Deserialize)]
#[serde(untagged)]
enum ChangeValue {
    Short(String),
    Detailed {
        #[serde(rename = "type")]
        change_type: String,
        #[serde(default)]
        dependents: Option<String>,
    },
}

#[serde_as]
#[derive(Deserialize)]
struct ChangesMap {
    #[serde(flatten)]
    #[serde_as(as = "MapPreventDuplicates<_, _>")]
    changes: IndexMap<String, ChangeValue>,
}

fn strip_line_ending(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

fn find_closing_delimiter(content: &str) -> Option<usize> {
    if content.starts_with(FRONT_MATTER_DELIMITER) {
        return Some(0);
    }
    if let Some(pos) = content.find("\r\n---") {
        return Some(pos + 2);
    }
    if let Some(pos) = content.find("\n---") {
        return Some(pos + 1);
    }
    None
}

fn extract_front_matter(content: &str) -> Result<(&str, &str), FormatError> {
    let trimmed = content.trim_start();

    if !trimmed.starts_with(FRONT_MATTER_DELIMITER) {
        return Err(FrontMatterError::MissingOpeningDelimiter.into());
    }

    let after_opening = &trimmed[FRONT_MATTER_DELIMITER.len()..];
    let after_opening = strip_line_ending(after_opening);

    let Some(closing_pos) = find_closing_delimiter(after_opening) else {
        return Err(FrontMatterError::MissingClosingDelimiter.into());
    };

    let yaml_content = &after_opening[..closing_pos];
    let yaml_content = yaml_content.trim_end_matches('\r');
    if yaml_content.trim().is_empty() {
        return Err(FrontMatterError::EmptyFrontMatter.into());
    }

    let after_closing = &after_opening[closing_pos + FRONT_MATTER_DELIMITER.len()..];
    let body = strip_line_ending(after_closing);

    Ok((yaml_content, body))
}

/// Parses a Markdown change file whose front matter maps package names to
/// bump types. Every package listed shares the body as its description.
///
/// ```text
/// ---
/// "core": minor
/// "utils": { type: patch, dependents: none }
/// ---
/// Add streaming API.
/// ```
///
/// # Errors
///
/// Returns a `FormatError` for malformed front matter, duplicate package
/// keys, oversized input or a file without any package entry.
#[must_use = "parsing result should be handled"]
pub fn parse_change_file(source: &str, content: &str) -> Result<Vec<RawChange>, FormatError> {
    if content.len() > MAX_INPUT_SIZE {
        return Err(ValidationError::InputTooLarge {
            max_bytes: MAX_INPUT_SIZE,
        }
        .into());
    }

    let (yaml_content, body) = extract_front_matter(content)?;

    let parsed: ChangesMap = serde_yml::from_str(yaml_content)?;
    if parsed.changes.is_empty() {
        return Err(ValidationError::NoChanges.into());
    }

    let description = body.trim().to_string();

    Ok(parsed
        .changes
        .into_iter()
        .map(|(package, value)| match value {
            ChangeValue::Short(change_type) => {
                RawChange::new(source, package, change_type, description.clone())
            }
            ChangeValue::Detailed {
                change_type,
                dependents,
            } => {
                let change = RawChange::new(source, package, change_type, description.clone());
                match dependents {
                    Some(dependents) => change.with_dependent_change_type(dependents),
                    None => change,
                }
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_package_with_summary() {
        let content = r#"---
"my-package": patch
---
Fix critical bug in authentication flow.
"#;

        let changes = parse_change_file("fix-auth.md", content).expect("should parse");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].source, "fix-auth.md");
        assert_eq!(changes[0].package, "my-package");
        assert_eq!(changes[0].change_type, "patch");
        assert_eq!(
            changes[0].description,
            "Fix critical bug in authentication flow."
        );
        assert!(changes[0].dependent_change_type.is_none());
    }

    #[test]
    fn multiple_packages_preserve_order() {
        let content = r#"---
"pkg-one": major
"pkg-two": minor
"pkg-three": patch
---
Breaking change to API.
"#;

        let changes = parse_change_file("api.md", content).expect("should parse");
        let names: Vec<_> = changes.iter().map(|c| c.package.as_str()).collect();
        assert_eq!(names, vec!["pkg-one", "pkg-two", "pkg-three"]);
        assert!(changes.iter().all(|c| c.description == "Breaking change to API."));
    }

    #[test]
    fn detailed_entry_carries_dependent_override() {
        let content = r#"---
"core": { type: minor, dependents: none }
"utils": patch
---
Internal refactor.
"#;

        let changes = parse_change_file("refactor.md", content).expect("should parse");
        assert_eq!(changes[0].change_type, "minor");
        assert_eq!(changes[0].dependent_change_type.as_deref(), Some("none"));
        assert!(changes[1].dependent_change_type.is_none());
    }

    #[test]
    fn unknown_bump_type_is_passed_through() {
        let content = "---\n\"my-crate\": gigantic\n---\nSummary.\n";

        let changes = parse_change_file("x.md", content).expect("should parse");
        assert_eq!(changes[0].change_type, "gigantic");
    }

    #[test]
    fn multiline_summary() {
        let content = r#"---
"my-crate": minor
---
This is a multiline summary.

- Feature one
- Feature two
"#;

        let changes = parse_change_file("x.md", content).expect("should parse");
        assert!(changes[0].description.contains("multiline summary"));
        assert!(changes[0].description.contains("Feature two"));
    }

    #[test]
    fn empty_body() {
        let content = "---\n\"my-crate\": patch\n---\n";

        let changes = parse_change_file("x.md", content).expect("should parse");
        assert!(changes[0].description.is_empty());
    }

    #[test]
    fn delimiter_inside_summary() {
        let content = r#"---
"my-crate": patch
---
Summary with --- inside text should not break parsing.
"#;

        let changes = parse_change_file("x.md", content).expect("should parse");
        assert!(changes[0].description.contains("---"));
    }

    #[test]
    fn windows_line_endings() {
        let content = "---\r\n\"my-crate\": patch\r\n---\r\nWindows style summary.\r\n";

        let changes = parse_change_file("x.md", content).expect("should parse");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].package, "my-crate");
        assert!(changes[0].description.contains("Windows style summary"));
    }

    #[test]
    fn error_missing_opening_delimiter() {
        let content = "\n\"my-crate\": patch\n---\nSome summary.\n";

        let err = parse_change_file("x.md", content).expect_err("should fail");
        assert!(err.to_string().contains("opening delimiter"));
    }

    #[test]
    fn error_missing_closing_delimiter() {
        let content = "---\n\"my-crate\": patch\nSome summary without closing delimiter.\n";

        let err = parse_change_file("x.md", content).expect_err("should fail");
        assert!(err.to_string().contains("closing delimiter"));
    }

    #[test]
    fn error_empty_front_matter() {
        let content = "---\n---\nSome summary.\n";

        let err = parse_change_file("x.md", content).expect_err("should fail");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn error_empty_changes() {
        let content = "---\n{}\n---\nSome summary.\n";

        let err = parse_change_file("x.md", content).expect_err("should fail");
        assert!(err.to_string().contains("at least one package"));
    }

    #[test]
    fn error_input_too_large() {
        let huge_content = "a".repeat(MAX_INPUT_SIZE + 1);

        let err = parse_change_file("x.md", &huge_content).expect_err("should fail");
        assert!(err.to_string().contains("maximum size"));
    }

    #[test]
    fn error_duplicate_package() {
        let content = r#"---
"my-crate": major
"my-crate": patch
---
Some summary.
"#;

        let err = parse_change_file("x.md", content).expect_err("should fail");
        let err_str = err.to_string();
        assert!(
            err_str.contains("duplicate"),
            "Expected 'duplicate' in error message, got: {err_str}"
        );
    }
}
