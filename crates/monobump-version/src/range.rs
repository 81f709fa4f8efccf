use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

/// How a dependent declares its range on a freshly bumped internal package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    #[default]
    Caret,
    Tilde,
    Exact,
    /// Keep whatever operator the existing range uses.
    Preserve,
}

impl fmt::Display for RangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Caret => "caret",
            Self::Tilde => "tilde",
            Self::Exact => "exact",
            Self::Preserve => "preserve",
        };
        write!(f, "{s}")
    }
}

const OPERATORS: [&str; 5] = [">=", "^", "~", "=", ">"];

/// Ranges that track the workspace rather than a concrete version.
#[must_use]
pub fn is_rewritable_range(range: &str) -> bool {
    let range = range.trim();
    !(range.is_empty() || range == "*" || range.starts_with("workspace:"))
}

/// Range a dependent should declare on `version`.
///
/// Returns `None` for ranges that must be left alone (`*`, `workspace:`).
/// Under [`RangePolicy::Preserve`] only a single comparator on a full
/// version (`^1.2.0`, `>=1.2.0`, `1.2.0`) is rewritten; anything else
/// (`<2.0.0`, `1.x`, `^1 || ^2`) is kept.
#[must_use]
pub fn range_for(version: &Version, policy: RangePolicy, existing: &str) -> Option<String> {
    if !is_rewritable_range(existing) {
        return None;
    }

    let operator = match policy {
        RangePolicy::Caret => "^",
        RangePolicy::Tilde => "~",
        RangePolicy::Exact => "",
        RangePolicy::Preserve => existing_operator(existing)?,
    };

    Some(format!("{operator}{version}"))
}

fn existing_operator(range: &str) -> Option<&'static str> {
    let range = range.trim();
    let operator = OPERATORS
        .iter()
        .find(|op| range.starts_with(**op))
        .copied()
        .unwrap_or("");

    Version::parse(range[operator.len()..].trim_start())
        .is_ok()
        .then_some(operator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).expect("valid version")
    }

    #[test]
    fn caret_policy_ignores_existing_operator() {
        assert_eq!(
            range_for(&v("1.3.0"), RangePolicy::Caret, "~1.2.0").as_deref(),
            Some("^1.3.0")
        );
    }

    #[test]
    fn tilde_and_exact_policies() {
        assert_eq!(
            range_for(&v("2.0.0"), RangePolicy::Tilde, "^1.0.0").as_deref(),
            Some("~2.0.0")
        );
        assert_eq!(
            range_for(&v("2.0.0"), RangePolicy::Exact, "^1.0.0").as_deref(),
            Some("2.0.0")
        );
    }

    #[test]
    fn preserve_policy_keeps_operator() {
        assert_eq!(
            range_for(&v("1.3.0"), RangePolicy::Preserve, "~1.2.0").as_deref(),
            Some("~1.3.0")
        );
        assert_eq!(
            range_for(&v("1.3.0"), RangePolicy::Preserve, ">=1.2.0").as_deref(),
            Some(">=1.3.0")
        );
        assert_eq!(
            range_for(&v("1.3.0"), RangePolicy::Preserve, "1.2.0").as_deref(),
            Some("1.3.0")
        );
    }

    #[test]
    fn preserve_policy_keeps_compound_ranges() {
        for existing in ["<2.0.0", "1.x", "^1 || ^2", ">=1.0.0 <2.0.0", "^1.2"] {
            assert!(
                range_for(&v("1.3.0"), RangePolicy::Preserve, existing).is_none(),
                "{existing} should be kept"
            );
        }
        assert_eq!(
            range_for(&v("1.3.0"), RangePolicy::Caret, "<2.0.0").as_deref(),
            Some("^1.3.0")
        );
    }

    #[test]
    fn workspace_and_wildcard_ranges_are_left_alone() {
        assert!(range_for(&v("1.3.0"), RangePolicy::Caret, "*").is_none());
        assert!(range_for(&v("1.3.0"), RangePolicy::Caret, "workspace:^").is_none());
        assert!(range_for(&v("1.3.0"), RangePolicy::Caret, "").is_none());
    }

    #[test]
    fn prerelease_versions_render_in_full() {
        assert_eq!(
            range_for(&v("1.0.1-beta.0"), RangePolicy::Caret, "^1.0.0").as_deref(),
            Some("^1.0.1-beta.0")
        );
    }
}
