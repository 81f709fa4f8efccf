//! Bump computation for a set of internal packages.
//!
//! [`ChangeStore::load`] validates raw changes against the [`PackageGraph`],
//! [`policy::normalize`] applies group and lock rules, [`propagate`] walks the
//! dependency graph to a fixed point and [`assemble_changelogs`] orders the
//! changelog lines of every released package. [`compute_bumps`] and
//! [`plan_release`] chain these steps.
//!
//! [`PackageGraph`]: monobump_graph::PackageGraph

mod changelog;
mod error;
mod planner;
pub mod policy;
mod propagation;
pub mod providers;
mod store;
pub mod traits;
mod types;

#[cfg(test)]
pub(crate) mod mocks;

pub use changelog::{PackageChangelog, assemble_changelogs};
pub use error::{EngineError, Result};
pub use planner::{ReleaseOutput, compute_bumps, compute_bumps_with, plan_release};
pub use policy::{Normalized, Policy, normalize};
pub use propagation::{propagate, range_updates};
pub use store::ChangeStore;
pub use types::{BumpDecision, BumpPlan, DecisionReason, DependencyUpdate, LockedPackageConflict};
