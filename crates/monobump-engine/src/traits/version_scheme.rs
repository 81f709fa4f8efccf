use monobump_core::BumpType;
use monobump_version::{RangePolicy, VersionError};
use semver::Version;

/// Version arithmetic the engine delegates to.
pub trait VersionScheme: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the bumped component cannot be incremented.
    fn bump(&self, current: &Version, bump: BumpType) -> Result<Version, VersionError>;

    /// # Errors
    ///
    /// Returns an error if the identifier cannot form a valid prerelease.
    fn prerelease(&self, current: &Version, identifier: Option<&str>)
    -> Result<Version, VersionError>;

    /// Range a dependent should declare on `version`, or `None` when the
    /// existing range must be kept as-is.
    fn range_for(&self, version: &Version, policy: RangePolicy, existing: &str) -> Option<String>;
}
