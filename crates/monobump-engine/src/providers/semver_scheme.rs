use monobump_core::BumpType;
use monobump_version::{RangePolicy, VersionError};
use semver::Version;

use crate::traits::VersionScheme;

pub struct SemverScheme;

impl SemverScheme {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SemverScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionScheme for SemverScheme {
    fn bump(&self, current: &Version, bump: BumpType) -> Result<Version, VersionError> {
        monobump_version::bump_version(current, bump)
    }

    fn prerelease(
        &self,
        current: &Version,
        identifier: Option<&str>,
    ) -> Result<Version, VersionError> {
        monobump_version::prerelease_version(current, identifier)
    }

    fn range_for(&self, version: &Version, policy: RangePolicy, existing: &str) -> Option<String> {
        monobump_version::range_for(version, policy, existing)
    }
}
