//! Relay-subset search shared by the fixed-size strategies.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{debug, info};

use super::combinatorics::Combinations;
use super::AssignmentOutcome;
use crate::branch::{argmin, is_cancelled, run_branches};
use crate::error::{LogisticsError, Result};
use crate::models::AssignmentSolution;
use crate::network::Network;

/// Assignment proposed for one relay subset.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub assignment: AssignmentSolution,
    pub total: f64,
    pub history: Vec<f64>,
}

/// Every `k`-subset of the network's relays, as node indices.
pub(crate) fn relay_subsets(network: &Network, k: usize) -> Vec<Vec<usize>> {
    let relays = network.relays();
    Combinations::new(relays.len(), k)
        .map(|combo| combo.into_iter().map(|i| relays[i]).collect())
        .collect()
}

/// The candidate closest to `from`; first wins on ties.
///
/// `candidates` must not be empty.
pub(crate) fn nearest_of(network: &Network, from: usize, candidates: &[usize]) -> usize {
    let mut best = candidates[0];
    let mut best_d = f64::INFINITY;
    for &c in candidates {
        let d = network.distance_between(from, c);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

/// Links every sink to its nearest relay among `relays`.
///
/// Returns the summed sink distance.
pub(crate) fn link_sinks_to_nearest(
    network: &Network,
    relays: &[usize],
    assignment: &mut AssignmentSolution,
) -> f64 {
    let mut total = 0.0;
    for &sink in network.sinks() {
        let relay = nearest_of(network, sink, relays);
        total += network.distance_between(sink, relay);
        assignment.link_sink(network.node_at(sink).id(), network.node_at(relay).id());
    }
    total
}

/// Checks the source/relay counts required by the exhaustive and greedy
/// strategies.
pub(crate) fn check_paired_topology(network: &Network, relay_count: usize) -> Result<()> {
    if relay_count == 0 {
        return Err(LogisticsError::InvalidParameter(
            "relay_count must be positive".into(),
        ));
    }
    if network.sources().len() != relay_count {
        return Err(LogisticsError::InvalidTopology(format!(
            "expected {relay_count} sources, found {}",
            network.sources().len()
        )));
    }
    if network.relays().len() < relay_count {
        return Err(LogisticsError::InvalidTopology(format!(
            "expected at least {relay_count} relays, found {}",
            network.relays().len()
        )));
    }
    Ok(())
}

/// Evaluates every `relay_count`-subset with `evaluate` and keeps the
/// cheapest candidate.
///
/// Distances are warmed first so branches only read the cache. A branch
/// skipped by cancellation yields no candidate; the winner is the first
/// minimum in enumeration order.
pub(crate) fn search_subsets<F>(
    strategy: &'static str,
    network: &Network,
    relay_count: usize,
    cancel: &Option<Arc<AtomicBool>>,
    evaluate: F,
) -> Result<AssignmentOutcome>
where
    F: Fn(usize, &[usize]) -> Result<Candidate> + Send + Sync,
{
    network.warm_distances();
    let subsets = relay_subsets(network, relay_count);

    info!(
        event = "assignment_start",
        strategy,
        sources = network.sources().len(),
        relays = network.relays().len(),
        sinks = network.sinks().len(),
        subsets = subsets.len(),
    );

    let results: Vec<Option<Candidate>> = run_branches(subsets.len(), |b| -> Result<_> {
        if is_cancelled(cancel) {
            return Ok(None);
        }
        let candidate = evaluate(b, &subsets[b])?;
        debug!(event = "subset_evaluated", strategy, subset = b, total = candidate.total);
        Ok(Some(candidate))
    })
    .into_iter()
    .collect::<Result<_>>()?;

    let cancelled = is_cancelled(cancel);
    let mut candidates: Vec<(usize, Candidate)> = results
        .into_iter()
        .enumerate()
        .filter_map(|(b, c)| c.map(|c| (b, c)))
        .collect();
    let evaluated = candidates.len();
    let Some(winner) = argmin(candidates.iter().map(|(_, c)| c.total)) else {
        return Err(if cancelled {
            LogisticsError::Cancelled
        } else {
            LogisticsError::NoFeasibleSolution(format!(
                "no subset of {relay_count} relays produced an assignment"
            ))
        });
    };
    let (subset, best) = candidates.swap_remove(winner);

    let mut chosen = network.filtered_by_index(&subsets[subset])?;
    chosen.set_assignment(best.assignment)?;

    info!(
        event = "assignment_end",
        strategy,
        evaluated,
        best_total = best.total,
        cancelled,
    );

    Ok(AssignmentOutcome {
        strategy,
        network: chosen,
        total_cost: best.total,
        evaluated,
        history: best.history,
        activation: None,
        cancelled,
    })
}
