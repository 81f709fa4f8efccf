mod config;
mod error;
mod raw;

pub const DEFAULT_CONFIG_FILE: &str = "monobump.toml";

pub use config::{
    BumpConfig, EdgeOverride, LockPolicy, PackageGroup, PrereleasePropagation, load_config,
    parse_config,
};
pub use error::ConfigError;

pub type Result<T> = std::result::Result<T, ConfigError>;
