//! Group and lock rules applied before propagation.

use indexmap::{IndexMap, IndexSet};
use monobump_config::{BumpConfig, LockPolicy};
use monobump_core::{BumpType, ChangeRecord, ChangeType, RecordId, RecordOrigin};
use monobump_graph::PackageGraph;
use tracing::{debug, warn};

use crate::types::LockedPackageConflict;

/// Groups and locks resolved against one graph.
///
/// Groups merge `config.groups` with manifest `group` flags by name. A
/// package named in a config group stays there even if its manifest names
/// another group. Locked packages never take part in group lockstep.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    groups: IndexMap<String, Vec<String>>,
    membership: IndexMap<String, String>,
    locks: IndexMap<String, LockPolicy>,
}

impl Policy {
    #[must_use]
    pub fn resolve(graph: &PackageGraph, config: &BumpConfig) -> Self {
        let mut locks = IndexMap::new();
        for package in graph.packages() {
            if let Some(policy) = config.lock_policy(&package.name) {
                locks.insert(package.name.clone(), policy.clone());
            } else if package.locked {
                locks.insert(package.name.clone(), LockPolicy::Skip);
            }
        }
        for name in config.locked().keys() {
            if !graph.contains(name) {
                debug!(package = %name, "lock entry names no package in the graph");
            }
        }

        let mut membership: IndexMap<String, String> = IndexMap::new();
        for group in config.groups() {
            for member in &group.members {
                if graph.contains(member) {
                    membership.insert(member.clone(), group.name.clone());
                } else {
                    warn!(group = %group.name, package = %member, "group member is not in the graph");
                }
            }
        }
        for package in graph.packages() {
            if let Some(group) = &package.group {
                membership
                    .entry(package.name.clone())
                    .or_insert_with(|| group.clone());
            }
        }

        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        for package in graph.packages() {
            if locks.contains_key(&package.name) {
                continue;
            }
            if let Some(group) = membership.get(&package.name) {
                groups
                    .entry(group.clone())
                    .or_default()
                    .push(package.name.clone());
            }
        }

        Self {
            groups,
            membership,
            locks,
        }
    }

    #[must_use]
    pub fn lock(&self, package: &str) -> Option<&LockPolicy> {
        self.locks.get(package)
    }

    #[must_use]
    pub fn is_skipped(&self, package: &str) -> bool {
        matches!(self.lock(package), Some(LockPolicy::Skip))
    }

    #[must_use]
    pub fn pin(&self, package: &str) -> Option<&semver::Version> {
        match self.lock(package) {
            Some(LockPolicy::Pin(version)) => Some(version),
            _ => None,
        }
    }

    #[must_use]
    pub fn group_of(&self, package: &str) -> Option<&str> {
        self.membership.get(package).map(String::as_str)
    }

    /// Unlocked members of each group, in graph order.
    #[must_use]
    pub fn groups(&self) -> &IndexMap<String, Vec<String>> {
        &self.groups
    }

    /// Unlocked members sharing `package`'s group, excluding `package`.
    /// Empty for locked or ungrouped packages.
    pub fn siblings<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a str> {
        let members = if self.locks.contains_key(package) {
            None
        } else {
            self.group_of(package).and_then(|group| self.groups.get(group))
        };

        members
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(move |member| *member != package)
    }
}

/// Records ready for propagation.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<ChangeRecord>,
    pub dropped: Vec<LockedPackageConflict>,
    pub policy: Policy,
}

impl Normalized {
    pub fn for_package<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ChangeRecord> {
        self.records.iter().filter(move |r| r.package == name)
    }
}

/// Drops records for `skip`-locked packages and levels every group to its
/// highest requested change.
///
/// Synthesized records carry [`RecordOrigin::Group`], the group name as
/// their source and no description, so they never reach a changelog.
#[must_use]
pub fn normalize(records: &[ChangeRecord], graph: &PackageGraph, config: &BumpConfig) -> Normalized {
    let policy = Policy::resolve(graph, config);

    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = Vec::new();

    for record in records {
        if policy.is_skipped(&record.package) {
            if record.change_type != ChangeType::Release(BumpType::None) {
                warn!(
                    record = %record.id,
                    source = %record.source,
                    package = %record.package,
                    change_type = %record.change_type,
                    "dropping change for locked package"
                );
                dropped.push(LockedPackageConflict {
                    record: record.id,
                    source: record.source.clone(),
                    package: record.package.clone(),
                    change_type: record.change_type,
                });
            }
            continue;
        }
        kept.push(record.clone());
    }

    let mut next_id = records.iter().map(|r| r.id.0 + 1).max().unwrap_or(0);
    let mut synthesized = Vec::new();

    for (group, members) in policy.groups() {
        let group_records: Vec<&ChangeRecord> = kept
            .iter()
            .filter(|r| members.contains(&r.package))
            .collect();

        let Some(target) = group_target(group_records.iter().map(|r| r.change_type)) else {
            continue;
        };

        for member in members {
            let own = group_target(
                group_records
                    .iter()
                    .filter(|r| &r.package == member)
                    .map(|r| r.change_type),
            );
            if own.is_some_and(|own| covers(own, target)) {
                continue;
            }

            debug!(group = %group, package = %member, change_type = %target, "synthesizing group record");
            synthesized.push(ChangeRecord {
                id: RecordId(next_id),
                source: group.clone(),
                package: member.clone(),
                change_type: target,
                dependent_change_type: None,
                description: String::new(),
                timestamp: None,
                origin: RecordOrigin::Group {
                    group: group.clone(),
                },
            });
            next_id += 1;
        }
    }

    kept.extend(synthesized);

    Normalized {
        records: kept,
        dropped,
        policy,
    }
}

/// Highest applicable change in `changes`: the max release bump, or
/// `prerelease` when nothing above `none` was requested.
fn group_target(changes: impl Iterator<Item = ChangeType>) -> Option<ChangeType> {
    let mut max = BumpType::None;
    let mut prerelease = false;
    for change in changes {
        max = max.max(change.bump_type());
        prerelease |= change.is_prerelease();
    }

    if max.is_release() {
        Some(ChangeType::Release(max))
    } else if prerelease {
        Some(ChangeType::Prerelease)
    } else {
        None
    }
}

fn covers(own: ChangeType, target: ChangeType) -> bool {
    match (own, target) {
        (ChangeType::Release(own), ChangeType::Release(target)) => own >= target,
        (_, ChangeType::Prerelease) => true,
        (ChangeType::Prerelease, ChangeType::Release(_)) => false,
    }
}

/// Packages named in any record, in graph order.
pub(crate) fn touched_packages<'a>(
    records: &'a [ChangeRecord],
    graph: &'a PackageGraph,
) -> IndexSet<&'a str> {
    let named: IndexSet<&str> = records.iter().map(|r| r.package.as_str()).collect();
    graph.names().filter(|name| named.contains(name)).collect()
}
