use monobump_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed change file '{file}' (package '{package}')")]
    MalformedChangeFile {
        file: String,
        package: String,
        #[source]
        source: CoreError,
    },

    #[error("change file '{file}' targets unknown package '{name}' (available: {available})")]
    UnknownPackage {
        file: String,
        name: String,
        available: String,
    },

    #[error("version calculation failed for package '{package}'")]
    Version {
        package: String,
        #[source]
        source: monobump_version::VersionError,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
