use std::path::PathBuf;

use indexmap::IndexMap;
use monobump_core::{BumpType, DependencyKind, PackageManifest};
use semver::Version;

use crate::error::GraphError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub range: String,
    pub kind: DependencyKind,
    pub propagate: Option<BumpType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: Version,
    pub path: PathBuf,
    pub private: bool,
    pub locked: bool,
    pub group: Option<String>,
    pub dependencies: IndexMap<String, Dependency>,
}

impl TryFrom<PackageManifest> for Package {
    type Error = GraphError;

    fn try_from(manifest: PackageManifest) -> Result<Self, Self::Error> {
        let version = monobump_version::parse_version(&manifest.version).map_err(|source| {
            GraphError::InvalidVersion {
                package: manifest.name.clone(),
                source,
            }
        })?;

        let dependencies = manifest
            .dependencies
            .into_iter()
            .map(|(name, dep)| {
                let dependency = Dependency {
                    name: name.clone(),
                    range: dep.range,
                    kind: dep.kind,
                    propagate: dep.propagate,
                };
                (name, dependency)
            })
            .collect();

        Ok(Self {
            name: manifest.name,
            version,
            path: manifest.path,
            private: manifest.private,
            locked: manifest.locked,
            group: manifest.group,
            dependencies,
        })
    }
}
