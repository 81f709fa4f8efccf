//! Turns change-file contents into [`RawChange`] values.
//!
//! Two layouts are understood: Markdown with YAML front matter mapping
//! package names to bump types, and JSON objects carrying a single change or
//! a `changes` array. Bump-type strings are passed through untouched; their
//! validation happens when records are loaded against the package graph.

mod error;
mod json;
mod parse;

pub use error::{FormatError, FrontMatterError, ValidationError};
pub use json::parse_json_change_file;
pub use parse::parse_change_file;

use monobump_core::RawChange;

pub(crate) const MAX_INPUT_SIZE: usize = 100 * 1024 * 1024;

/// Parses either layout, picking JSON when the content starts with `{`.
///
/// # Errors
///
/// Returns a `FormatError` when the content matches neither layout.
pub fn parse_any(source: &str, content: &str) -> Result<Vec<RawChange>, FormatError> {
    if content.trim_start().starts_with('{') {
        parse_json_change_file(source, content)
    } else {
        parse_change_file(source, content)
    }
}
