use std::sync::Mutex;

use monobump_core::BumpType;
use monobump_version::{RangePolicy, VersionError};
use semver::Version;

use crate::traits::VersionScheme;

/// Semver arithmetic that records every call it receives.
pub struct MockVersionScheme {
    bumps: Mutex<Vec<(Version, BumpType)>>,
    prereleases: Mutex<Vec<(Version, Option<String>)>>,
    fixed_range: Option<String>,
}

impl MockVersionScheme {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bumps: Mutex::new(Vec::new()),
            prereleases: Mutex::new(Vec::new()),
            fixed_range: None,
        }
    }

    /// Answers every range request with `range`, ignoring the policy.
    #[must_use]
    pub fn with_fixed_range(mut self, range: impl Into<String>) -> Self {
        self.fixed_range = Some(range.into());
        self
    }

    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn bump_calls(&self) -> Vec<(Version, BumpType)> {
        self.bumps.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn prerelease_calls(&self) -> Vec<(Version, Option<String>)> {
        self.prereleases.lock().expect("lock poisoned").clone()
    }
}

impl VersionScheme for MockVersionScheme {
    fn bump(&self, current: &Version, bump: BumpType) -> Result<Version, VersionError> {
        self.bumps
            .lock()
            .expect("lock poisoned")
            .push((current.clone(), bump));
        monobump_version::bump_version(current, bump)
    }

    fn prerelease(
        &self,
        current: &Version,
        identifier: Option<&str>,
    ) -> Result<Version, VersionError> {
        self.prereleases
            .lock()
            .expect("lock poisoned")
            .push((current.clone(), identifier.map(ToString::to_string)));
        monobump_version::prerelease_version(current, identifier)
    }

    fn range_for(&self, version: &Version, policy: RangePolicy, existing: &str) -> Option<String> {
        match &self.fixed_range {
            Some(range) => Some(range.clone()),
            None => monobump_version::range_for(version, policy, existing),
        }
    }
}
