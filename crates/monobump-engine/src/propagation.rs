use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use monobump_config::{BumpConfig, PrereleasePropagation};
use monobump_core::{BumpType, DependencyKind, RecordId};
use monobump_graph::{Dependency, PackageGraph};
use semver::Version;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::policy::{Normalized, touched_packages};
use crate::traits::VersionScheme;
use crate::types::{BumpDecision, DecisionReason, DependencyUpdate};

#[derive(Debug, Clone, Copy, Default)]
struct PackageState {
    severity: BumpType,
    prerelease: bool,
    /// Highest `dependent_change_type` among the package's own records.
    hint: Option<BumpType>,
    reason: Option<DecisionReason>,
}

impl PackageState {
    fn raise(&mut self, bump: BumpType, reason: DecisionReason) -> bool {
        if bump <= self.severity {
            return false;
        }
        self.severity = bump;
        self.reason.get_or_insert(reason);
        true
    }

    /// Bump this package pushes along an edge with the given floor, if any.
    ///
    /// A `dependent_change_type` hint replaces the floor, so a `none` hint
    /// stops propagation. An edge floor of `none` always opts out.
    fn outgoing(&self, floor: BumpType, config: &BumpConfig) -> Option<BumpType> {
        if !floor.is_release() {
            return None;
        }
        if !self.severity.is_release()
            && !(self.prerelease
                && config.prerelease_propagation() == PrereleasePropagation::Floor)
        {
            return None;
        }

        let mut bump = self.hint.unwrap_or(floor);
        if !bump.is_release() {
            return None;
        }
        if config.forward_severity() {
            bump = bump.max(self.severity);
        }
        Some(bump)
    }
}

/// Effective floor of the edge `dependent -> dependency`.
///
/// Config overrides win over the manifest's own `propagate` value; dev edges
/// default to `none`, other kinds to `config.dependent_floor()`.
fn edge_floor(config: &BumpConfig, dependent: &str, dependency: &Dependency) -> BumpType {
    if let Some(floor) = config.edge_override(dependent, &dependency.name) {
        return floor;
    }
    match (dependency.propagate, dependency.kind) {
        (Some(floor), _) => floor,
        (None, DependencyKind::Dev) => BumpType::None,
        (None, DependencyKind::Normal | DependencyKind::Peer) => config.dependent_floor(),
    }
}

/// Severity implied by moving from `current` to a pinned version.
fn pin_severity(current: &Version, pin: &Version) -> BumpType {
    if current == pin {
        BumpType::None
    } else if current.major != pin.major {
        BumpType::Major
    } else if current.minor != pin.minor {
        BumpType::Minor
    } else {
        BumpType::Patch
    }
}

type States<'a> = IndexMap<&'a str, PackageState>;

/// Computes a decision for every package that must change.
///
/// Runs a FIFO worklist over reverse dependency edges. A package is queued
/// again only when its severity rises, and severity only rises within
/// `none < patch < minor < major`, so the walk terminates on cyclic graphs.
///
/// # Errors
///
/// Returns `EngineError::Version` when the scheme cannot compute the new
/// version of a package.
pub fn propagate(
    normalized: &Normalized,
    graph: &PackageGraph,
    config: &BumpConfig,
    scheme: &dyn VersionScheme,
) -> Result<IndexMap<String, BumpDecision>> {
    let mut states = seed_states(normalized, graph);
    run_worklist(&mut states, normalized, graph, config);

    let mut decisions = decide_versions(&states, normalized, graph, config, scheme)?;
    rewrite_ranges(&mut decisions, graph, config, scheme);

    Ok(decisions)
}

fn seed_states<'a>(normalized: &Normalized, graph: &'a PackageGraph) -> States<'a> {
    let mut states: States<'a> = graph
        .names()
        .map(|name| (name, PackageState::default()))
        .collect();

    for record in &normalized.records {
        let Some(state) = states.get_mut(record.package.as_str()) else {
            continue;
        };
        state.severity = state.severity.max(record.change_type.bump_type());
        state.prerelease |= record.change_type.is_prerelease();
        if let Some(hint) = record.dependent_change_type {
            state.hint = Some(state.hint.map_or(hint, |current| current.max(hint)));
        }
        if state.reason != Some(DecisionReason::ChangeFile) {
            state.reason = Some(if record.is_from_change_file() {
                DecisionReason::ChangeFile
            } else {
                DecisionReason::Group
            });
        }
    }

    for package in graph.packages() {
        let Some(pin) = normalized.policy.pin(&package.name) else {
            continue;
        };
        if let Some(state) = states.get_mut(package.name.as_str()) {
            state.severity = pin_severity(&package.version, pin);
            state.prerelease = false;
            state.reason = Some(DecisionReason::Pinned);
        }
    }

    states
}

fn run_worklist(
    states: &mut States<'_>,
    normalized: &Normalized,
    graph: &PackageGraph,
    config: &BumpConfig,
) {
    let policy = &normalized.policy;
    let mut queue: VecDeque<&str> = VecDeque::new();
    let mut queued: HashSet<&str> = HashSet::new();

    for name in touched_packages(&normalized.records, graph)
        .into_iter()
        .chain(graph.names().filter(|name| policy.pin(name).is_some()))
    {
        if queued.insert(name) {
            debug!(package = %name, state = ?states.get(name), "seeding package");
            queue.push_back(name);
        }
    }

    while let Some(name) = queue.pop_front() {
        queued.remove(name);
        let Some(state) = states.get(name).copied() else {
            continue;
        };

        for edge in graph.dependents(name) {
            let dependent = edge.dependent.name.as_str();
            let floor = edge_floor(config, dependent, edge.dependency);
            let Some(bump) = state.outgoing(floor, config) else {
                continue;
            };
            if policy.lock(dependent).is_some() {
                debug!(package = %dependent, dependency = %name, "not raising locked package");
                continue;
            }

            let lockstep = std::iter::once((dependent, DecisionReason::Dependency))
                .chain(policy.siblings(dependent).map(|s| (s, DecisionReason::Group)));
            for (target, reason) in lockstep {
                let Some(target_state) = states.get_mut(target) else {
                    continue;
                };
                if target_state.raise(bump, reason) {
                    debug!(package = %target, dependency = %name, bump = %bump, "raised package");
                    if queued.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
    }
}

fn decide_versions(
    states: &States<'_>,
    normalized: &Normalized,
    graph: &PackageGraph,
    config: &BumpConfig,
    scheme: &dyn VersionScheme,
) -> Result<IndexMap<String, BumpDecision>> {
    let mut decisions = IndexMap::new();

    for package in graph.packages() {
        let name = package.name.as_str();
        let Some(state) = states.get(name) else {
            continue;
        };
        let records: Vec<RecordId> = normalized
            .for_package(name)
            .filter(|r| r.is_from_change_file())
            .map(|r| r.id)
            .collect();

        let (prerelease, new_version) = if let Some(pin) = normalized.policy.pin(name) {
            if *pin == package.version && records.is_empty() {
                continue;
            }
            (!pin.pre.is_empty(), pin.clone())
        } else if state.severity.is_release() {
            let version = scheme
                .bump(&package.version, state.severity)
                .map_err(|source| EngineError::Version {
                    package: name.to_string(),
                    source,
                })?;
            (false, version)
        } else if state.prerelease {
            let version = scheme
                .prerelease(&package.version, config.prerelease_identifier())
                .map_err(|source| EngineError::Version {
                    package: name.to_string(),
                    source,
                })?;
            (true, version)
        } else {
            continue;
        };

        decisions.insert(
            name.to_string(),
            BumpDecision {
                name: name.to_string(),
                bump_type: state.severity,
                prerelease,
                current_version: package.version.clone(),
                new_version,
                dependency_updates: Vec::new(),
                reason: state.reason.unwrap_or(DecisionReason::Dependency),
                private: package.private,
                records,
            },
        );
    }

    Ok(decisions)
}

/// Records a range rewrite on every decided package's edge to another
/// package whose version changes.
fn rewrite_ranges(
    decisions: &mut IndexMap<String, BumpDecision>,
    graph: &PackageGraph,
    config: &BumpConfig,
    scheme: &dyn VersionScheme,
) {
    let new_versions = changed_versions(decisions);

    for decision in decisions.values_mut() {
        decision.dependency_updates =
            stale_ranges(&decision.name, &new_versions, graph, config, scheme);
    }
}

/// Range rewrites for packages without a decision that declare a range on a
/// package whose version changes.
///
/// Dev edges and `none` floors leave the dependent's version alone but its
/// declared range still follows the dependency. Packages locked with `skip`
/// are left untouched.
pub fn range_updates(
    decisions: &IndexMap<String, BumpDecision>,
    normalized: &Normalized,
    graph: &PackageGraph,
    config: &BumpConfig,
    scheme: &dyn VersionScheme,
) -> IndexMap<String, Vec<DependencyUpdate>> {
    let new_versions = changed_versions(decisions);
    if new_versions.is_empty() {
        return IndexMap::new();
    }

    graph
        .names()
        .filter(|name| !decisions.contains_key(*name) && !normalized.policy.is_skipped(name))
        .filter_map(|name| {
            let updates = stale_ranges(name, &new_versions, graph, config, scheme);
            if updates.is_empty() {
                return None;
            }
            debug!(package = %name, updates = updates.len(), "rewriting ranges of unchanged package");
            Some((name.to_string(), updates))
        })
        .collect()
}

fn changed_versions(decisions: &IndexMap<String, BumpDecision>) -> IndexMap<String, Version> {
    decisions
        .values()
        .filter(|d| d.changes_version())
        .map(|d| (d.name.clone(), d.new_version.clone()))
        .collect()
}

fn stale_ranges(
    name: &str,
    new_versions: &IndexMap<String, Version>,
    graph: &PackageGraph,
    config: &BumpConfig,
    scheme: &dyn VersionScheme,
) -> Vec<DependencyUpdate> {
    let mut updates = Vec::new();
    for (target, dependency) in graph.dependencies(name) {
        let Some(version) = new_versions.get(&target.name) else {
            continue;
        };
        let Some(range) = scheme.range_for(version, config.range_policy(), &dependency.range)
        else {
            continue;
        };
        if range != dependency.range {
            updates.push(DependencyUpdate {
                dependency: target.name.clone(),
                kind: dependency.kind,
                old_range: dependency.range.clone(),
                new_range: range,
                version: version.clone(),
            });
        }
    }
    updates
}
