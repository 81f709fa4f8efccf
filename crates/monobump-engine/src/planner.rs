use indexmap::IndexMap;
use monobump_config::BumpConfig;
use monobump_core::RawChange;
use monobump_graph::PackageGraph;
use tracing::info;

use crate::Result;
use crate::changelog::{PackageChangelog, assemble_changelogs};
use crate::policy::normalize;
use crate::propagation::{propagate, range_updates};
use crate::providers::SemverScheme;
use crate::store::ChangeStore;
use crate::traits::VersionScheme;
use crate::types::BumpPlan;

/// A bump plan together with the changelog content it implies.
#[derive(Debug, Clone)]
pub struct ReleaseOutput {
    pub plan: BumpPlan,
    pub changelogs: IndexMap<String, PackageChangelog>,
}

/// Computes the bump plan for `raw` changes with semver arithmetic.
///
/// # Errors
///
/// Returns an error if a change is malformed or targets an unknown package,
/// or if a prerelease version cannot be formed.
pub fn compute_bumps(
    raw: impl IntoIterator<Item = RawChange>,
    graph: &PackageGraph,
    config: &BumpConfig,
) -> Result<BumpPlan> {
    compute_bumps_with(raw, graph, config, &SemverScheme::new())
}

/// Like [`compute_bumps`], with a custom version scheme.
///
/// # Errors
///
/// See [`compute_bumps`].
pub fn compute_bumps_with(
    raw: impl IntoIterator<Item = RawChange>,
    graph: &PackageGraph,
    config: &BumpConfig,
    scheme: &dyn VersionScheme,
) -> Result<BumpPlan> {
    let store = ChangeStore::load(raw, graph)?;
    plan_from_store(&store, graph, config, scheme)
}

/// Computes the bump plan and assembles changelogs in one pass.
///
/// # Errors
///
/// See [`compute_bumps`].
pub fn plan_release(
    raw: impl IntoIterator<Item = RawChange>,
    graph: &PackageGraph,
    config: &BumpConfig,
) -> Result<ReleaseOutput> {
    let store = ChangeStore::load(raw, graph)?;
    let plan = plan_from_store(&store, graph, config, &SemverScheme::new())?;
    let changelogs = assemble_changelogs(&plan.decisions, &store);

    Ok(ReleaseOutput { plan, changelogs })
}

fn plan_from_store(
    store: &ChangeStore,
    graph: &PackageGraph,
    config: &BumpConfig,
    scheme: &dyn VersionScheme,
) -> Result<BumpPlan> {
    let normalized = normalize(store.records(), graph, config);
    let decisions = propagate(&normalized, graph, config, scheme)?;
    let range_updates = range_updates(&decisions, &normalized, graph, config, scheme);

    info!(
        records = store.len(),
        decisions = decisions.len(),
        range_updates = range_updates.len(),
        dropped = normalized.dropped.len(),
        "computed bump plan"
    );

    Ok(BumpPlan {
        decisions,
        range_updates,
        dropped: normalized.dropped,
        consumed_sources: store.sources(),
    })
}
