use std::fmt;

use indexmap::IndexMap;
use monobump_core::{BumpType, ChangeType, DependencyKind, RecordId};
use monobump_graph::{GraphError, PackageGraph};
use semver::Version;

/// Why a package ended up in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// At least one change file targets the package.
    ChangeFile,
    /// Bumped in lockstep with another member of its group.
    Group,
    /// Reached only through a bumped dependency.
    Dependency,
    /// Locked with a pin; the version is forced to the pin target.
    Pinned,
}

/// A range rewrite on an internal dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyUpdate {
    pub dependency: String,
    pub kind: DependencyKind,
    pub old_range: String,
    pub new_range: String,
    /// New version of the dependency.
    pub version: Version,
}

/// Final outcome for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpDecision {
    pub name: String,
    pub bump_type: BumpType,
    /// Set when the version change is a prerelease increment.
    pub prerelease: bool,
    pub current_version: Version,
    pub new_version: Version,
    pub dependency_updates: Vec<DependencyUpdate>,
    pub reason: DecisionReason,
    pub private: bool,
    /// Change-file records that target this package.
    pub records: Vec<RecordId>,
}

impl BumpDecision {
    #[must_use]
    pub fn changes_version(&self) -> bool {
        self.new_version != self.current_version
    }
}

/// A record dropped because it targets a package locked with `skip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPackageConflict {
    pub record: RecordId,
    pub source: String,
    pub package: String,
    pub change_type: ChangeType,
}

impl fmt::Display for LockedPackageConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ignored {} change {} from '{}': package '{}' is locked",
            self.change_type, self.record, self.source, self.package
        )
    }
}

/// Everything the external writers need for one release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BumpPlan {
    /// Decisions in package declaration order.
    pub decisions: IndexMap<String, BumpDecision>,
    /// Range rewrites on packages that keep their version.
    pub range_updates: IndexMap<String, Vec<DependencyUpdate>>,
    pub dropped: Vec<LockedPackageConflict>,
    /// Change-file identifiers read for this release.
    pub consumed_sources: Vec<String>,
}

impl BumpPlan {
    #[must_use]
    pub fn decision(&self, name: &str) -> Option<&BumpDecision> {
        self.decisions.get(name)
    }

    /// True when nothing in the graph would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty() && self.range_updates.is_empty()
    }

    /// Writes new versions and dependency ranges back into `graph`.
    ///
    /// # Errors
    ///
    /// Returns a `GraphError` if the plan mentions a package or edge the
    /// graph does not have, which means it was computed for another graph.
    pub fn apply_to(&self, graph: &mut PackageGraph) -> Result<(), GraphError> {
        for decision in self.decisions.values() {
            graph.set_version(&decision.name, decision.new_version.clone())?;
            set_ranges(graph, &decision.name, &decision.dependency_updates)?;
        }
        for (name, updates) in &self.range_updates {
            set_ranges(graph, name, updates)?;
        }
        Ok(())
    }
}

fn set_ranges(
    graph: &mut PackageGraph,
    name: &str,
    updates: &[DependencyUpdate],
) -> Result<(), GraphError> {
    for update in updates {
        graph.set_dependency_range(name, &update.dependency, update.new_range.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use monobump_core::{DependencyManifest, PackageManifest};

    use super::*;

    #[test]
    fn apply_to_writes_ranges_of_unchanged_packages() {
        let mut graph = PackageGraph::build(vec![
            PackageManifest::new("core", "1.0.0"),
            PackageManifest::new("docs", "0.1.0").with_dependency_manifest(
                "core",
                DependencyManifest::new("^1.0.0").with_kind(DependencyKind::Dev),
            ),
        ])
        .expect("build graph");
        let mut plan = BumpPlan::default();
        plan.decisions.insert(
            "core".to_string(),
            BumpDecision {
                name: "core".to_string(),
                bump_type: BumpType::Major,
                prerelease: false,
                current_version: Version::new(1, 0, 0),
                new_version: Version::new(2, 0, 0),
                dependency_updates: Vec::new(),
                reason: DecisionReason::ChangeFile,
                private: false,
                records: vec![RecordId(0)],
            },
        );
        plan.range_updates.insert(
            "docs".to_string(),
            vec![DependencyUpdate {
                dependency: "core".to_string(),
                kind: DependencyKind::Dev,
                old_range: "^1.0.0".to_string(),
                new_range: "^2.0.0".to_string(),
                version: Version::new(2, 0, 0),
            }],
        );

        plan.apply_to(&mut graph).expect("apply");

        let docs = graph.package("docs").expect("docs exists");
        assert_eq!(docs.version, Version::new(0, 1, 0));
        assert_eq!(docs.dependencies["core"].range, "^2.0.0");
        assert_eq!(
            graph.package("core").expect("core exists").version,
            Version::new(2, 0, 0)
        );
    }

    #[test]
    fn conflict_display_names_package_and_source() {
        let conflict = LockedPackageConflict {
            record: RecordId(3),
            source: "legacy-fix.md".to_string(),
            package: "legacy".to_string(),
            change_type: ChangeType::Release(BumpType::Minor),
        };

        let msg = conflict.to_string();

        assert!(msg.contains("legacy-fix.md"));
        assert!(msg.contains("'legacy' is locked"));
        assert!(msg.contains("minor"));
    }
}
