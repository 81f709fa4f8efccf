use std::cmp::Reverse;

use indexmap::IndexMap;
use monobump_core::{BumpType, ChangeRecord};
use semver::Version;

use crate::store::ChangeStore;
use crate::types::BumpDecision;

/// Changelog content for one released package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageChangelog {
    pub package: String,
    pub version: Version,
    pub bump_type: BumpType,
    pub prerelease: bool,
    /// Most recent change first, then one line per dependency bump.
    pub lines: Vec<String>,
}

impl PackageChangelog {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

struct ChangelogAggregator<'a> {
    records_by_package: IndexMap<&'a str, Vec<&'a ChangeRecord>>,
}

impl<'a> ChangelogAggregator<'a> {
    fn new(store: &'a ChangeStore) -> Self {
        let mut records_by_package: IndexMap<&str, Vec<&ChangeRecord>> = IndexMap::new();
        for record in store.records() {
            if record.is_from_change_file() && !record.description.trim().is_empty() {
                records_by_package
                    .entry(record.package.as_str())
                    .or_default()
                    .push(record);
            }
        }

        for records in records_by_package.values_mut() {
            records.sort_by_key(|r| Reverse((r.timestamp, r.id)));
        }

        Self { records_by_package }
    }

    fn build(&self, decision: &BumpDecision) -> PackageChangelog {
        let mut lines: Vec<String> = self
            .records_by_package
            .get(decision.name.as_str())
            .into_iter()
            .flatten()
            .map(|r| r.description.trim().to_string())
            .collect();

        lines.extend(
            decision
                .dependency_updates
                .iter()
                .map(|update| format!("Bump {} to v{}", update.dependency, update.version)),
        );

        PackageChangelog {
            package: decision.name.clone(),
            version: decision.new_version.clone(),
            bump_type: decision.bump_type,
            prerelease: decision.prerelease,
            lines,
        }
    }
}

/// Orders the changelog lines of every decided package.
///
/// Only descriptions from change files are used; records synthesized for
/// groups contribute nothing. Records without a timestamp sort after those
/// with one, and ties go to the later record.
#[must_use]
pub fn assemble_changelogs(
    decisions: &IndexMap<String, BumpDecision>,
    store: &ChangeStore,
) -> IndexMap<String, PackageChangelog> {
    let aggregator = ChangelogAggregator::new(store);

    decisions
        .values()
        .map(|decision| (decision.name.clone(), aggregator.build(decision)))
        .collect()
}
