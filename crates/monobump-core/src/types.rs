use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Release severity lattice: `none < patch < minor < major`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl BumpType {
    #[must_use]
    pub fn is_release(self) -> bool {
        self > Self::None
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        };
        write!(f, "{s}")
    }
}

impl FromStr for BumpType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ChangeType::from_str(s)? {
            ChangeType::Release(bump) => Ok(bump),
            ChangeType::Prerelease => Err(CoreError::InvalidBumpType(s.to_string())),
        }
    }
}

/// The change a single record asks for.
///
/// `prerelease` sits outside the [`BumpType`] lattice: it never lowers a
/// scheduled release bump and only affects the version suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Release(BumpType),
    Prerelease,
}

impl ChangeType {
    #[must_use]
    pub fn bump_type(self) -> BumpType {
        match self {
            Self::Release(bump) => bump,
            Self::Prerelease => BumpType::None,
        }
    }

    #[must_use]
    pub fn is_prerelease(self) -> bool {
        matches!(self, Self::Prerelease)
    }
}

impl From<BumpType> for ChangeType {
    fn from(bump: BumpType) -> Self {
        Self::Release(bump)
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release(bump) => fmt::Display::fmt(bump, f),
            Self::Prerelease => write!(f, "prerelease"),
        }
    }
}

impl FromStr for ChangeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::Release(BumpType::None)),
            "patch" => Ok(Self::Release(BumpType::Patch)),
            "minor" => Ok(Self::Release(BumpType::Minor)),
            "major" => Ok(Self::Release(BumpType::Major)),
            "prerelease" => Ok(Self::Prerelease),
            other => Err(CoreError::InvalidBumpType(other.to_string())),
        }
    }
}

/// A change as read from a change file, before semantic validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChange {
    /// Identifier of the change file this entry came from.
    pub source: String,
    pub package: String,
    pub change_type: String,
    #[serde(default)]
    pub dependent_change_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawChange {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        package: impl Into<String>,
        change_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            package: package.into(),
            change_type: change_type.into(),
            dependent_change_type: None,
            description: description.into(),
            timestamp: None,
        }
    }

    #[must_use]
    pub fn with_dependent_change_type(mut self, change_type: impl Into<String>) -> Self {
        self.dependent_change_type = Some(change_type.into());
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    ChangeFile,
    /// Synthesized so that every member of a group bumps in lockstep.
    Group { group: String },
}

/// A validated change targeting one package of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub id: RecordId,
    pub source: String,
    pub package: String,
    pub change_type: ChangeType,
    /// Explicit bump forced onto dependents; `None` means the edge default applies.
    pub dependent_change_type: Option<BumpType>,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub origin: RecordOrigin,
}

impl ChangeRecord {
    #[must_use]
    pub fn is_from_change_file(&self) -> bool {
        self.origin == RecordOrigin::ChangeFile
    }
}
