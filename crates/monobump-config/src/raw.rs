use indexmap::IndexMap;
use monobump_core::BumpType;
use monobump_version::RangePolicy;
use serde::Deserialize;

use crate::config::PrereleasePropagation;

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct RawConfig {
    pub(crate) propagation: RawPropagation,
    pub(crate) groups: Vec<RawGroup>,
    pub(crate) locked: IndexMap<String, RawLock>,
    pub(crate) edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct RawPropagation {
    pub(crate) dependent_floor: Option<BumpType>,
    pub(crate) forward_severity: Option<bool>,
    pub(crate) prerelease: Option<PrereleasePropagation>,
    pub(crate) prerelease_identifier: Option<String>,
    pub(crate) range_policy: Option<RangePolicy>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGroup {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) members: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawLock {
    Policy(String),
    Pin { pin: String },
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEdge {
    pub(crate) dependent: String,
    pub(crate) dependency: String,
    pub(crate) propagate: BumpType,
}
