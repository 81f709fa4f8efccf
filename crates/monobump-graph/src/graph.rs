use indexmap::IndexMap;
use indexmap::map::Entry;
use monobump_core::PackageManifest;
use semver::Version;

use crate::Result;
use crate::error::GraphError;
use crate::package::{Dependency, Package};

/// A reverse edge: `dependent` declares `dependency` on the queried package.
#[derive(Debug, Clone, Copy)]
pub struct DependentEdge<'a> {
    pub dependent: &'a Package,
    pub dependency: &'a Dependency,
}

/// Internal packages and their "depends on" edges.
///
/// Cycles are allowed. Nothing here walks the graph recursively; callers
/// that traverse it keep their own worklist.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    packages: IndexMap<String, Package>,
    /// dependency name -> names of packages depending on it
    dependents: IndexMap<String, Vec<String>>,
}

impl PackageGraph {
    /// Builds the graph from manifest data.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DuplicatePackage` when two manifests share a name,
    /// `GraphError::InvalidVersion` for unparsable versions and
    /// `GraphError::DanglingDependency` for edges to undeclared packages.
    pub fn build(manifests: impl IntoIterator<Item = PackageManifest>) -> Result<Self> {
        let mut packages: IndexMap<String, Package> = IndexMap::new();

        for manifest in manifests {
            let package = Package::try_from(manifest)?;
            match packages.entry(package.name.clone()) {
                Entry::Occupied(entry) => {
                    return Err(GraphError::DuplicatePackage {
                        name: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(package);
                }
            }
        }

        let mut dependents: IndexMap<String, Vec<String>> =
            packages.keys().map(|name| (name.clone(), Vec::new())).collect();

        for package in packages.values() {
            for dependency in package.dependencies.keys() {
                let Some(list) = dependents.get_mut(dependency) else {
                    return Err(GraphError::DanglingDependency {
                        package: package.name.clone(),
                        dependency: dependency.clone(),
                    });
                };
                list.push(package.name.clone());
            }
        }

        Ok(Self {
            packages,
            dependents,
        })
    }

    #[must_use]
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Packages in declaration order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages that depend on `name`, with the edge each one declares.
    #[must_use]
    pub fn dependents(&self, name: &str) -> Vec<DependentEdge<'_>> {
        let Some(names) = self.dependents.get(name) else {
            return Vec::new();
        };

        names
            .iter()
            .filter_map(|dependent| {
                let package = self.packages.get(dependent)?;
                let dependency = package.dependencies.get(name)?;
                Some(DependentEdge {
                    dependent: package,
                    dependency,
                })
            })
            .collect()
    }

    /// Packages `name` depends on, with the edge to each.
    #[must_use]
    pub fn dependencies(&self, name: &str) -> Vec<(&Package, &Dependency)> {
        let Some(package) = self.packages.get(name) else {
            return Vec::new();
        };

        package
            .dependencies
            .values()
            .filter_map(|dep| self.packages.get(&dep.name).map(|target| (target, dep)))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `GraphError::UnknownPackage` if `name` is not in the graph.
    pub fn set_version(&mut self, name: &str, version: Version) -> Result<()> {
        let package = self
            .packages
            .get_mut(name)
            .ok_or_else(|| GraphError::UnknownPackage(name.to_string()))?;
        package.version = version;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `GraphError::UnknownPackage` or `GraphError::UnknownDependency`
    /// when the edge does not exist.
    pub fn set_dependency_range(
        &mut self,
        dependent: &str,
        dependency: &str,
        range: impl Into<String>,
    ) -> Result<()> {
        let package = self
            .packages
            .get_mut(dependent)
            .ok_or_else(|| GraphError::UnknownPackage(dependent.to_string()))?;
        let edge = package.dependencies.get_mut(dependency).ok_or_else(|| {
            GraphError::UnknownDependency {
                package: dependent.to_string(),
                dependency: dependency.to_string(),
            }
        })?;
        edge.range = range.into();
        Ok(())
    }
}
