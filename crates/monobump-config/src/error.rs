use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to read config at '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid lock policy '{value}' for package '{package}' (expected \"skip\" or {{ pin = \"<version>\" }})")]
    InvalidLockPolicy { package: String, value: String },

    #[error("invalid pin version for package '{package}'")]
    InvalidPinVersion {
        package: String,
        #[source]
        source: monobump_version::VersionError,
    },

    #[error("package '{package}' is listed in both group '{first}' and group '{second}'")]
    OverlappingGroups {
        package: String,
        first: String,
        second: String,
    },

    #[error("group '{0}' has no members")]
    EmptyGroup(String),
}
