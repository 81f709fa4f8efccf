mod range;

use monobump_core::BumpType;
use semver::{BuildMetadata, Prerelease, Version};
use thiserror::Error;

pub use range::{RangePolicy, is_rewritable_range, range_for};

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid prerelease identifier '{identifier}'")]
    InvalidPrerelease {
        identifier: String,
        #[source]
        source: semver::Error,
    },

    #[error("version '{version}' cannot be incremented further")]
    Overflow { version: String },

    #[error("failed to parse version '{version}'")]
    Parse {
        version: String,
        #[source]
        source: semver::Error,
    },
}

pub type Result<T> = std::result::Result<T, VersionError>;

/// Applies a release bump.
///
/// A prerelease version is first released as-is when it is already at the
/// requested level: `2.0.0-beta.1` bumped `major` becomes `2.0.0`.
///
/// # Errors
///
/// Returns `VersionError::Overflow` if the bumped component is already at
/// `u64::MAX`.
pub fn bump_version(version: &Version, bump_type: BumpType) -> Result<Version> {
    let mut new_version = version.clone();
    new_version.build = BuildMetadata::EMPTY;

    let was_prerelease = !version.pre.is_empty();
    new_version.pre = Prerelease::EMPTY;

    match bump_type {
        BumpType::None => return Ok(version.clone()),
        BumpType::Major => {
            if !(was_prerelease && version.minor == 0 && version.patch == 0) {
                new_version.major = increment(version, version.major)?;
            }
            new_version.minor = 0;
            new_version.patch = 0;
        }
        BumpType::Minor => {
            if !(was_prerelease && version.patch == 0) {
                new_version.minor = increment(version, version.minor)?;
            }
            new_version.patch = 0;
        }
        BumpType::Patch => {
            if !was_prerelease {
                new_version.patch = increment(version, version.patch)?;
            }
        }
    }

    Ok(new_version)
}

fn increment(version: &Version, component: u64) -> Result<u64> {
    component.checked_add(1).ok_or_else(|| VersionError::Overflow {
        version: version.to_string(),
    })
}

/// Advances the prerelease counter, starting a new prerelease on the next
/// patch when the version is stable.
///
/// `1.0.0` with `beta` gives `1.0.1-beta.0`; `1.0.1-beta.0` gives
/// `1.0.1-beta.1`; a different identifier restarts the counter.
///
/// # Errors
///
/// Returns `VersionError::InvalidPrerelease` if the identifier is not a valid
/// semver prerelease component.
pub fn prerelease_version(version: &Version, identifier: Option<&str>) -> Result<Version> {
    let mut new_version = version.clone();
    new_version.build = BuildMetadata::EMPTY;

    let next = if version.pre.is_empty() {
        new_version.patch = increment(version, version.patch)?;
        start_prerelease(identifier)
    } else {
        advance_prerelease(version.pre.as_str(), identifier).ok_or_else(|| {
            VersionError::Overflow {
                version: version.to_string(),
            }
        })?
    };

    new_version.pre = Prerelease::new(&next).map_err(|source| VersionError::InvalidPrerelease {
        identifier: next.clone(),
        source,
    })?;

    Ok(new_version)
}

fn start_prerelease(identifier: Option<&str>) -> String {
    match identifier {
        Some(id) if !id.is_empty() => format!("{id}.0"),
        _ => "0".to_string(),
    }
}

fn advance_prerelease(current: &str, identifier: Option<&str>) -> Option<String> {
    let mut parts: Vec<String> = current.split('.').map(str::to_string).collect();

    if let Some(id) = identifier.filter(|id| !id.is_empty()) {
        if parts.first().map(String::as_str) != Some(id) {
            return Some(format!("{id}.0"));
        }
    }

    let last_numeric = parts
        .iter()
        .rposition(|part| part.parse::<u64>().is_ok());

    match last_numeric {
        Some(pos) => {
            let n: u64 = parts[pos].parse().ok()?;
            parts[pos] = n.checked_add(1)?.to_string();
        }
        None => parts.push("0".to_string()),
    }

    Some(parts.join("."))
}

/// Parses a version string, trimming a leading `v`.
///
/// # Errors
///
/// Returns `VersionError::Parse` if the string is not valid semver.
pub fn parse_version(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|source| VersionError::Parse {
        version: version.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).expect("valid version")
    }

    #[test]
    fn test_bump_patch() {
        assert_eq!(bump_version(&v("1.2.3"), BumpType::Patch).expect("bump"), v("1.2.4"));
    }

    #[test]
    fn test_bump_minor() {
        assert_eq!(bump_version(&v("1.2.3"), BumpType::Minor).expect("bump"), v("1.3.0"));
    }

    #[test]
    fn test_bump_major() {
        assert_eq!(bump_version(&v("1.2.3"), BumpType::Major).expect("bump"), v("2.0.0"));
    }

    #[test]
    fn test_bump_none_keeps_version() {
        assert_eq!(
            bump_version(&v("1.2.3+build.7"), BumpType::None).expect("bump"),
            v("1.2.3+build.7")
        );
    }

    #[test]
    fn bump_drops_build_metadata() {
        assert_eq!(bump_version(&v("1.2.3+build.7"), BumpType::Patch).expect("bump"), v("1.2.4"));
    }

    #[test]
    fn bump_releases_prerelease_at_same_level() {
        assert_eq!(bump_version(&v("2.0.0-beta.1"), BumpType::Major).expect("bump"), v("2.0.0"));
        assert_eq!(bump_version(&v("1.3.0-rc.0"), BumpType::Minor).expect("bump"), v("1.3.0"));
        assert_eq!(bump_version(&v("1.2.4-alpha"), BumpType::Patch).expect("bump"), v("1.2.4"));
    }

    #[test]
    fn bump_moves_past_prerelease_at_lower_level() {
        assert_eq!(bump_version(&v("1.2.4-alpha"), BumpType::Major).expect("bump"), v("2.0.0"));
        assert_eq!(bump_version(&v("1.2.4-alpha"), BumpType::Minor).expect("bump"), v("1.3.0"));
    }

    #[test]
    fn bump_zero_version_major() {
        assert_eq!(bump_version(&v("0.1.0"), BumpType::Major).expect("bump"), v("1.0.0"));
    }

    #[test]
    fn bump_at_component_limit_is_an_error() {
        let max = Version::new(u64::MAX, 0, 0);
        let err = bump_version(&max, BumpType::Major).expect_err("should overflow");
        assert!(matches!(err, VersionError::Overflow { .. }));

        let patch_max = Version::new(1, 0, u64::MAX);
        assert!(bump_version(&patch_max, BumpType::Patch).is_err());
        assert_eq!(
            bump_version(&patch_max, BumpType::Minor).expect("bump"),
            v("1.1.0")
        );
    }

    #[test]
    fn prerelease_counter_at_limit_is_an_error() {
        let version = v(&format!("1.0.1-beta.{}", u64::MAX));
        let err = prerelease_version(&version, Some("beta")).expect_err("should overflow");
        assert!(err.to_string().contains("cannot be incremented"));

        assert!(prerelease_version(&Version::new(1, 0, u64::MAX), None).is_err());
    }

    #[test]
    fn prerelease_from_stable_starts_on_next_patch() {
        let next = prerelease_version(&v("1.0.0"), Some("beta")).expect("prerelease");
        assert_eq!(next, v("1.0.1-beta.0"));
    }

    #[test]
    fn prerelease_without_identifier_uses_numeric_counter() {
        let next = prerelease_version(&v("1.0.0"), None).expect("prerelease");
        assert_eq!(next, v("1.0.1-0"));

        let again = prerelease_version(&next, None).expect("prerelease");
        assert_eq!(again, v("1.0.1-1"));
    }

    #[test]
    fn prerelease_increments_existing_counter() {
        let next = prerelease_version(&v("1.0.1-beta.4"), Some("beta")).expect("prerelease");
        assert_eq!(next, v("1.0.1-beta.5"));
    }

    #[test]
    fn prerelease_with_new_identifier_restarts_counter() {
        let next = prerelease_version(&v("1.0.1-alpha.4"), Some("beta")).expect("prerelease");
        assert_eq!(next, v("1.0.1-beta.0"));
    }

    #[test]
    fn prerelease_appends_counter_when_missing() {
        let next = prerelease_version(&v("1.0.1-alpha"), None).expect("prerelease");
        assert_eq!(next, v("1.0.1-alpha.0"));
    }

    #[test]
    fn prerelease_rejects_invalid_identifier() {
        let err = prerelease_version(&v("1.0.0"), Some("bad id!")).expect_err("should fail");
        assert!(err.to_string().contains("bad id!"));
    }

    #[test]
    fn parse_version_accepts_v_prefix() {
        assert_eq!(parse_version("v1.2.3").expect("parse"), v("1.2.3"));
        assert!(parse_version("one.two").is_err());
    }
}
