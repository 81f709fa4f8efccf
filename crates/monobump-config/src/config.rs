use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use monobump_core::BumpType;
use monobump_version::RangePolicy;
use semver::Version;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::raw::{RawConfig, RawLock};

/// Whether a prerelease-only package pushes a bump onto its dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrereleasePropagation {
    #[default]
    Opaque,
    Floor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockPolicy {
    /// No version change is ever written.
    Skip,
    /// The version is forced to the given target.
    Pin(Version),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeOverride {
    pub dependent: String,
    pub dependency: String,
    pub propagate: BumpType,
}

#[derive(Debug, Clone)]
pub struct BumpConfig {
    dependent_floor: BumpType,
    forward_severity: bool,
    prerelease_propagation: PrereleasePropagation,
    prerelease_identifier: Option<String>,
    range_policy: RangePolicy,
    groups: Vec<PackageGroup>,
    locked: IndexMap<String, LockPolicy>,
    edges: Vec<EdgeOverride>,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            dependent_floor: BumpType::Patch,
            forward_severity: false,
            prerelease_propagation: PrereleasePropagation::default(),
            prerelease_identifier: None,
            range_policy: RangePolicy::default(),
            groups: Vec::new(),
            locked: IndexMap::new(),
            edges: Vec::new(),
        }
    }
}

impl BumpConfig {
    /// Floor applied to normal and peer edges without an explicit override.
    #[must_use]
    pub fn dependent_floor(&self) -> BumpType {
        self.dependent_floor
    }

    /// Whether dependents receive the dependency's own severity instead of
    /// just the floor.
    #[must_use]
    pub fn forward_severity(&self) -> bool {
        self.forward_severity
    }

    #[must_use]
    pub fn prerelease_propagation(&self) -> PrereleasePropagation {
        self.prerelease_propagation
    }

    #[must_use]
    pub fn prerelease_identifier(&self) -> Option<&str> {
        self.prerelease_identifier.as_deref()
    }

    #[must_use]
    pub fn range_policy(&self) -> RangePolicy {
        self.range_policy
    }

    #[must_use]
    pub fn groups(&self) -> &[PackageGroup] {
        &self.groups
    }

    #[must_use]
    pub fn locked(&self) -> &IndexMap<String, LockPolicy> {
        &self.locked
    }

    #[must_use]
    pub fn lock_policy(&self, package: &str) -> Option<&LockPolicy> {
        self.locked.get(package)
    }

    #[must_use]
    pub fn edges(&self) -> &[EdgeOverride] {
        &self.edges
    }

    #[must_use]
    pub fn edge_override(&self, dependent: &str, dependency: &str) -> Option<BumpType> {
        self.edges
            .iter()
            .rev()
            .find(|edge| edge.dependent == dependent && edge.dependency == dependency)
            .map(|edge| edge.propagate)
    }

    #[must_use]
    pub fn with_dependent_floor(mut self, floor: BumpType) -> Self {
        self.dependent_floor = floor;
        self
    }

    #[must_use]
    pub fn with_forward_severity(mut self, forward: bool) -> Self {
        self.forward_severity = forward;
        self
    }

    #[must_use]
    pub fn with_prerelease_propagation(mut self, propagation: PrereleasePropagation) -> Self {
        self.prerelease_propagation = propagation;
        self
    }

    #[must_use]
    pub fn with_prerelease_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.prerelease_identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigError::OverlappingGroups` when a member already belongs
    /// to another group, or `ConfigError::EmptyGroup` for a group without members.
    pub fn with_group<I, S>(mut self, name: impl Into<String>, members: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group = PackageGroup {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        };
        self.groups.push(group);
        validate_groups(&self.groups)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_lock(mut self, package: impl Into<String>, policy: LockPolicy) -> Self {
        self.locked.insert(package.into(), policy);
        self
    }

    #[must_use]
    pub fn with_edge_override(
        mut self,
        dependent: impl Into<String>,
        dependency: impl Into<String>,
        propagate: BumpType,
    ) -> Self {
        self.edges.push(EdgeOverride {
            dependent: dependent.into(),
            dependency: dependency.into(),
            propagate,
        });
        self
    }
}

fn validate_groups(groups: &[PackageGroup]) -> Result<(), ConfigError> {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    for group in groups {
        if group.members.is_empty() {
            return Err(ConfigError::EmptyGroup(group.name.clone()));
        }
        for member in &group.members {
            if let Some(first) = owners.insert(member.as_str(), group.name.as_str()) {
                if first != group.name {
                    return Err(ConfigError::OverlappingGroups {
                        package: member.clone(),
                        first: first.to_string(),
                        second: group.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn build_lock_policy(package: &str, raw: RawLock) -> Result<LockPolicy, ConfigError> {
    match raw {
        RawLock::Policy(value) if value == "skip" => Ok(LockPolicy::Skip),
        RawLock::Policy(value) => Err(ConfigError::InvalidLockPolicy {
            package: package.to_string(),
            value,
        }),
        RawLock::Pin { pin } => monobump_version::parse_version(&pin)
            .map(LockPolicy::Pin)
            .map_err(|source| ConfigError::InvalidPinVersion {
                package: package.to_string(),
                source,
            }),
    }
}

/// Parses configuration from TOML text. Missing sections fall back to defaults.
///
/// # Errors
///
/// Returns an error if the TOML is invalid, a lock policy is unknown, a pin
/// version does not parse or groups overlap.
pub fn parse_config(content: &str) -> Result<BumpConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(content)?;
    let defaults = BumpConfig::default();

    let groups: Vec<PackageGroup> = raw
        .groups
        .into_iter()
        .map(|g| PackageGroup {
            name: g.name,
            members: g.members,
        })
        .collect();
    validate_groups(&groups)?;

    let locked = raw
        .locked
        .into_iter()
        .map(|(package, lock)| {
            let policy = build_lock_policy(&package, lock)?;
            Ok((package, policy))
        })
        .collect::<Result<IndexMap<_, _>, ConfigError>>()?;

    let edges = raw
        .edges
        .into_iter()
        .map(|e| EdgeOverride {
            dependent: e.dependent,
            dependency: e.dependency,
            propagate: e.propagate,
        })
        .collect();

    let propagation = raw.propagation;

    Ok(BumpConfig {
        dependent_floor: propagation
            .dependent_floor
            .unwrap_or(defaults.dependent_floor),
        forward_severity: propagation
            .forward_severity
            .unwrap_or(defaults.forward_severity),
        prerelease_propagation: propagation
            .prerelease
            .unwrap_or(defaults.prerelease_propagation),
        prerelease_identifier: propagation
            .prerelease_identifier
            .filter(|id| !id.trim().is_empty()),
        range_policy: propagation.range_policy.unwrap_or(defaults.range_policy),
        groups,
        locked,
        edges,
    })
}

/// Reads and parses a config file.
///
/// # Errors
///
/// Returns `ConfigError::Read` if the file cannot be read, otherwise the
/// errors of [`parse_config`].
pub fn load_config(path: &Path) -> Result<BumpConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}
