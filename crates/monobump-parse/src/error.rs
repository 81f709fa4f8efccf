use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("missing opening delimiter '---'")]
    MissingOpeningDelimiter,

    #[error("missing closing delimiter '---'")]
    MissingClosingDelimiter,

    #[error("front matter is empty")]
    EmptyFrontMatter,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("change file must contain at least one package entry")]
    NoChanges,

    #[error("input exceeds maximum size of {max_bytes} bytes")]
    InputTooLarge { max_bytes: usize },

    #[error("change entry is missing a package name")]
    MissingPackageName,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
