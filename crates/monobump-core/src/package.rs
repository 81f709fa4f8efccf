use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::BumpType;

/// Which dependency table of a manifest an internal edge lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Normal,
    Dev,
    Peer,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Dev => "dev",
            Self::Peer => "peer",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DependencyKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "dev" => Ok(Self::Dev),
            "peer" => Ok(Self::Peer),
            other => Err(CoreError::InvalidDependencyKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyManifest {
    pub range: String,
    #[serde(default)]
    pub kind: DependencyKind,
    /// Overrides the kind's default propagation floor for this edge.
    #[serde(default)]
    pub propagate: Option<BumpType>,
}

impl DependencyManifest {
    #[must_use]
    pub fn new(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            kind: DependencyKind::Normal,
            propagate: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: DependencyKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_propagate(mut self, floor: BumpType) -> Self {
        self.propagate = Some(floor);
        self
    }
}

/// Package data as handed over by a manifest reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub group: Option<String>,
    /// Internal dependencies only, keyed by package name.
    #[serde(default)]
    pub dependencies: IndexMap<String, DependencyManifest>,
}

impl PackageManifest {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from("packages").join(&name),
            name,
            version: version.into(),
            private: false,
            locked: false,
            group: None,
            dependencies: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.dependencies
            .insert(name.into(), DependencyManifest::new(range));
        self
    }

    #[must_use]
    pub fn with_dependency_manifest(
        mut self,
        name: impl Into<String>,
        dependency: DependencyManifest,
    ) -> Self {
        self.dependencies.insert(name.into(), dependency);
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }
}
