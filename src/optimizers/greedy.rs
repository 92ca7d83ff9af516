//! Greedy source-relay matching over relay subsets.
//!
//! Within each subset, all (source, relay) pairs are sorted by distance and
//! committed in that order whenever both ends are still free. This is the
//! classic greedy matching: cheap, but never better than the exhaustive
//! pairing on the same subset.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::search::{check_paired_topology, link_sinks_to_nearest, search_subsets, Candidate};
use super::{AssignmentOutcome, AssignmentStrategy};
use crate::error::Result;
use crate::models::AssignmentSolution;
use crate::network::Network;

/// Greedy optimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyConfig {
    /// Size of the relay subset; the network must have exactly this many
    /// sources.
    pub relay_count: usize,
    #[serde(skip)]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            relay_count: 3,
            cancel: None,
        }
    }
}

impl GreedyConfig {
    pub fn with_relay_count(mut self, k: usize) -> Self {
        self.relay_count = k;
        self
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Greedy matching over all relay subsets.
#[derive(Debug, Clone, Default)]
pub struct GreedyOptimizer {
    config: GreedyConfig,
}

impl GreedyOptimizer {
    pub fn new(config: GreedyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GreedyConfig {
        &self.config
    }
}

impl AssignmentStrategy for GreedyOptimizer {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn optimize(&self, network: &Network) -> Result<AssignmentOutcome> {
        let k = self.config.relay_count;
        check_paired_topology(network, k)?;
        search_subsets(self.name(), network, k, &self.config.cancel, |_, subset| {
            Ok(evaluate_subset(network, subset))
        })
    }
}

fn evaluate_subset(network: &Network, subset: &[usize]) -> Candidate {
    let sources = network.sources();

    let mut pairs: Vec<(usize, usize, f64)> = Vec::with_capacity(sources.len() * subset.len());
    for (si, &s) in sources.iter().enumerate() {
        for (ri, &r) in subset.iter().enumerate() {
            pairs.push((si, ri, network.distance_between(s, r)));
        }
    }
    // stable: equal distances keep source-major order
    pairs.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut source_used = vec![false; sources.len()];
    let mut relay_used = vec![false; subset.len()];
    let mut remaining = sources.len().min(subset.len());
    let mut assignment = AssignmentSolution::new();
    let mut total = 0.0;

    for (si, ri, d) in pairs {
        if remaining == 0 {
            break;
        }
        if source_used[si] || relay_used[ri] {
            continue;
        }
        source_used[si] = true;
        relay_used[ri] = true;
        remaining -= 1;
        total += d;
        assignment.link_source(
            network.node_at(sources[si]).id(),
            network.node_at(subset[ri]).id(),
        );
    }

    total += link_sinks_to_nearest(network, subset, &mut assignment);

    Candidate {
        assignment,
        total,
        history: Vec::new(),
    }
}
