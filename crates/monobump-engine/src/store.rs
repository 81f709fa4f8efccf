use indexmap::IndexSet;
use monobump_core::{BumpType, ChangeRecord, ChangeType, RawChange, RecordId, RecordOrigin};
use monobump_graph::PackageGraph;

use crate::error::{EngineError, Result};

/// Validated change records, in the order they were read.
#[derive(Debug, Clone, Default)]
pub struct ChangeStore {
    records: Vec<ChangeRecord>,
}

impl ChangeStore {
    /// Validates raw changes against the graph.
    ///
    /// Duplicate records for one package are all kept.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedChangeFile` for an unrecognized bump or
    /// dependent bump type and `EngineError::UnknownPackage` for a target
    /// absent from the graph. The first invalid record aborts the load.
    pub fn load(raw: impl IntoIterator<Item = RawChange>, graph: &PackageGraph) -> Result<Self> {
        let records = raw
            .into_iter()
            .enumerate()
            .map(|(index, change)| Self::validate(RecordId(index), change, graph))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { records })
    }

    fn validate(id: RecordId, change: RawChange, graph: &PackageGraph) -> Result<ChangeRecord> {
        let malformed = |source| EngineError::MalformedChangeFile {
            file: change.source.clone(),
            package: change.package.clone(),
            source,
        };

        let change_type: ChangeType = change.change_type.parse().map_err(malformed)?;
        let dependent_change_type = change
            .dependent_change_type
            .as_deref()
            .map(str::parse::<BumpType>)
            .transpose()
            .map_err(malformed)?;

        if !graph.contains(&change.package) {
            return Err(EngineError::UnknownPackage {
                file: change.source,
                name: change.package,
                available: graph.names().collect::<Vec<_>>().join(", "),
            });
        }

        Ok(ChangeRecord {
            id,
            source: change.source,
            package: change.package,
            change_type,
            dependent_change_type,
            description: change.description,
            timestamp: change.timestamp,
            origin: RecordOrigin::ChangeFile,
        })
    }

    #[must_use]
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn for_package<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ChangeRecord> {
        self.records.iter().filter(move |r| r.package == name)
    }

    /// Change-file identifiers in first-seen order.
    #[must_use]
    pub fn sources(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.source.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use monobump_core::{CoreError, PackageManifest};

    use super::*;

    fn graph() -> PackageGraph {
        PackageGraph::build(vec![
            PackageManifest::new("core", "1.0.0"),
            PackageManifest::new("web", "2.0.0").with_dependency("core", "^1.0.0"),
        ])
        .expect("build graph")
    }

    #[test]
    fn load_empty_changes_returns_empty_store() {
        let store = ChangeStore::load(Vec::new(), &graph()).expect("load");

        assert!(store.is_empty());
        assert!(store.sources().is_empty());
    }

    #[test]
    fn load_keeps_duplicates_in_order() {
        let store = ChangeStore::load(
            vec![
                RawChange::new("a.md", "web", "patch", "Fix layout"),
                RawChange::new("b.md", "web", "major", "Drop IE support"),
                RawChange::new("a.md", "core", "minor", "Add hooks"),
            ],
            &graph(),
        )
        .expect("load");

        assert_eq!(store.len(), 3);
        assert_eq!(store.for_package("web").count(), 2);
        assert_eq!(store.records()[1].id, RecordId(1));
        assert_eq!(store.sources(), vec!["a.md", "b.md"]);

        let web: Vec<_> = store.for_package("web").map(|r| r.change_type).collect();
        assert_eq!(
            web,
            vec![
                ChangeType::Release(BumpType::Patch),
                ChangeType::Release(BumpType::Major)
            ]
        );
    }

    #[test]
    fn load_parses_dependent_override() {
        let store = ChangeStore::load(
            vec![RawChange::new("a.md", "core", "minor", "x").with_dependent_change_type("none")],
            &graph(),
        )
        .expect("load");

        assert_eq!(store.records()[0].dependent_change_type, Some(BumpType::None));
        assert!(store.records()[0].is_from_change_file());
    }

    #[test]
    fn unknown_bump_type_is_malformed() {
        let err = ChangeStore::load(
            vec![RawChange::new("bad.md", "web", "gigantic", "x")],
            &graph(),
        )
        .expect_err("should fail");

        match err {
            EngineError::MalformedChangeFile {
                file,
                package,
                source,
            } => {
                assert_eq!(file, "bad.md");
                assert_eq!(package, "web");
                assert_eq!(source, CoreError::InvalidBumpType("gigantic".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prerelease_is_not_a_valid_dependent_override() {
        let err = ChangeStore::load(
            vec![RawChange::new("bad.md", "web", "patch", "x").with_dependent_change_type("prerelease")],
            &graph(),
        )
        .expect_err("should fail");

        assert!(matches!(err, EngineError::MalformedChangeFile { .. }));
    }

    #[test]
    fn unknown_package_is_rejected_with_available_list() {
        let err = ChangeStore::load(
            vec![RawChange::new("ghost.md", "ghost", "patch", "x")],
            &graph(),
        )
        .expect_err("should fail");

        match err {
            EngineError::UnknownPackage {
                file,
                name,
                available,
            } => {
                assert_eq!(file, "ghost.md");
                assert_eq!(name, "ghost");
                assert_eq!(available, "core, web");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
