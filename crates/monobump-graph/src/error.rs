use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("package '{name}' is declared more than once")]
    DuplicatePackage { name: String },

    #[error("package '{package}' depends on '{dependency}', which is not part of the graph")]
    DanglingDependency { package: String, dependency: String },

    #[error("invalid version for package '{package}'")]
    InvalidVersion {
        package: String,
        #[source]
        source: monobump_version::VersionError,
    },

    #[error("unknown package '{0}'")]
    UnknownPackage(String),

    #[error("package '{package}' has no dependency on '{dependency}'")]
    UnknownDependency { package: String, dependency: String },
}
