//! Brute-force relay selection and source pairing.
//!
//! # Algorithm
//!
//! For every subset of `relay_count` relays, every one-to-one pairing of the
//! sources with the subset is scored by total L1 distance and the cheapest
//! pairing kept. Sinks go to their nearest relay of the subset. The subset
//! with the lowest total (pairing plus sink distance) wins.
//!
//! The search visits C(r, k) · k! pairings, so it is meant for small
//! instances (a handful of relays).

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::combinatorics::Permutations;
use super::search::{check_paired_topology, link_sinks_to_nearest, search_subsets, Candidate};
use super::{AssignmentOutcome, AssignmentStrategy};
use crate::error::Result;
use crate::models::AssignmentSolution;
use crate::network::Network;

/// Exhaustive optimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhaustiveConfig {
    /// Size of the relay subset; the network must have exactly this many
    /// sources.
    pub relay_count: usize,
    /// Cooperative cancellation, checked before each subset.
    #[serde(skip)]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ExhaustiveConfig {
    fn default() -> Self {
        Self {
            relay_count: 3,
            cancel: None,
        }
    }
}

impl ExhaustiveConfig {
    pub fn with_relay_count(mut self, k: usize) -> Self {
        self.relay_count = k;
        self
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Optimal source pairing over all relay subsets.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Node, NodeRole};
/// use u_logistics::network::Network;
/// use u_logistics::optimizers::{AssignmentStrategy, ExhaustiveConfig, ExhaustiveOptimizer};
///
/// let network = Network::from_nodes(vec![
///     Node::new("M1", "M1", NodeRole::Source, 0.0, 0.0),
///     Node::new("W1", "W1", NodeRole::Relay, 1.0, 0.0),
///     Node::new("W2", "W2", NodeRole::Relay, 9.0, 0.0),
///     Node::new("S1", "S1", NodeRole::Sink, 2.0, 0.0),
/// ])
/// .unwrap();
///
/// let optimizer = ExhaustiveOptimizer::new(ExhaustiveConfig::default().with_relay_count(1));
/// let outcome = optimizer.optimize(&network).unwrap();
/// assert_eq!(outcome.total_cost, 2.0);
/// assert_eq!(outcome.network.ids_with_role(NodeRole::Relay), vec!["W1"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveOptimizer {
    config: ExhaustiveConfig,
}

impl ExhaustiveOptimizer {
    pub fn new(config: ExhaustiveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExhaustiveConfig {
        &self.config
    }
}

impl AssignmentStrategy for ExhaustiveOptimizer {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    /// # Errors
    ///
    /// - [`LogisticsError::InvalidParameter`](crate::LogisticsError::InvalidParameter)
    ///   if `relay_count` is zero
    /// - [`LogisticsError::InvalidTopology`](crate::LogisticsError::InvalidTopology)
    ///   if the source count differs from `relay_count` or there are fewer
    ///   relays than that
    /// - [`LogisticsError::Cancelled`](crate::LogisticsError::Cancelled) if
    ///   cancelled before any subset was evaluated
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

    let mut best_pairing: Vec<usize> = (0..subset.len()).collect();
    let mut best_distance = f64::INFINITY;
    for perm in Permutations::new(subset.len()) {
        let distance: f64 = sources
            .iter()
            .zip(&perm)
            .map(|(&s, &p)| network.distance_between(s, subset[p]))
            .sum();
        if distance < best_distance {
            best_distance = distance;
            best_pairing = perm;
        }
    }

    let mut assignment = AssignmentSolution::new();
    for (&s, &p) in sources.iter().zip(&best_pairing) {
        assignment.link_source(network.node_at(s).id(), network.node_at(subset[p]).id());
    }
    let sink_distance = link_sinks_to_nearest(network, subset, &mut assignment);

    Candidate {
        assignment,
        total: best_distance + sink_distance,
        history: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogisticsError;
    use crate::models::{Node, NodeRole};
    use crate::optimizers::tests::example_network;

    #[test]
    fn test_example_pairing() {
        let network = example_network();
        let outcome = ExhaustiveOptimizer::default()
            .optimize(&network)
            .expect("valid topology");
        let links = outcome.network.assignment().source_links();
        assert_eq!(links["M1"].iter().collect::<Vec<_>>(), vec!["W1"]);
        assert_eq!(links["M2"].iter().collect::<Vec<_>>(), vec!["W2"]);
        assert_eq!(links["M3"].iter().collect::<Vec<_>>(), vec!["W3"]);

        let source_total: f64 = outcome
            .network
            .assignment()
            .source_pairs()
            .map(|(s, r)| outcome.network.distance(s, r).expect("known ids"))
            .sum();
        assert!((source_total - 9.0).abs() < 1e-10);
        assert!((outcome.total_cost - 18.0).abs() < 1e-10);
        assert!((outcome.network.total_network_distance().expect("known ids") - 18.0).abs() < 1e-10);
        assert_eq!(outcome.evaluated, 1);
        assert_eq!(outcome.network.delivery_paths().len(), 3);
    }

    #[test]
    fn test_sinks_go_to_nearest_relay() {
        let outcome = ExhaustiveOptimizer::default()
            .optimize(&example_network())
            .expect("valid topology");
        let net = &outcome.network;
        for (sink, relay) in net.assignment().sink_pairs() {
            let chosen = net.distance(sink, relay).expect("known ids");
            for other in net.ids_with_role(NodeRole::Relay) {
                assert!(chosen <= net.distance(sink, other).expect("known ids"));
            }
        }
    }

    #[test]
    fn test_picks_best_subset() {
        let network = Network::from_nodes(vec![
            Node::new("M1", "M1", NodeRole::Source, 0.0, 0.0),
            Node::new("M2", "M2", NodeRole::Source, 10.0, 0.0),
            Node::new("FAR", "FAR", NodeRole::Relay, 50.0, 50.0),
            Node::new("W1", "W1", NodeRole::Relay, 1.0, 0.0),
            Node::new("W2", "W2", NodeRole::Relay, 9.0, 0.0),
            Node::new("S1", "S1", NodeRole::Sink, 5.0, 0.0),
        ])
        .expect("valid nodes");

        let outcome = ExhaustiveOptimizer::new(ExhaustiveConfig::default().with_relay_count(2))
            .optimize(&network)
            .expect("valid topology");
        assert_eq!(outcome.evaluated, 3);
        assert_eq!(outcome.network.ids_with_role(NodeRole::Relay), vec!["W1", "W2"]);
        // 1 + 1 for the pairing, 4 to either relay for the sink
        assert!((outcome.total_cost - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_topology_errors() {
        let network = example_network();
        let err = ExhaustiveOptimizer::new(ExhaustiveConfig::default().with_relay_count(2))
            .optimize(&network)
            .unwrap_err();
        assert!(matches!(err, LogisticsError::InvalidTopology(_)));

        let err = ExhaustiveOptimizer::new(ExhaustiveConfig::default().with_relay_count(0))
            .optimize(&network)
            .unwrap_err();
        assert!(matches!(err, LogisticsError::InvalidParameter(_)));

        let few_relays = network
            .filtered_copy(&["W1", "W2"])
            .expect("known relays");
        let err = ExhaustiveOptimizer::default().optimize(&few_relays).unwrap_err();
        assert!(matches!(err, LogisticsError::InvalidTopology(_)));
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let err = ExhaustiveOptimizer::new(ExhaustiveConfig::default().with_cancel(flag))
            .optimize(&example_network())
            .unwrap_err();
        assert_eq!(err, LogisticsError::Cancelled);
    }
}
