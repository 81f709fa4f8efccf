use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid bump type '{0}' (expected one of: none, patch, minor, major, prerelease)")]
    InvalidBumpType(String),

    #[error("invalid dependency kind '{0}' (expected one of: normal, dev, peer)")]
    InvalidDependencyKind(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
