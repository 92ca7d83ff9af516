//! Facility assignment optimizers.
//!
//! Four interchangeable strategies choose relays and assign sources and
//! sinks to them:
//!
//! - [`ExhaustiveOptimizer`]: every relay subset, every source pairing
//! - [`GreedyOptimizer`]: every relay subset, greedy source matching
//! - [`ClusteredAnnealingOptimizer`]: k-means over sources, then annealing
//! - [`HubActivationOptimizer`]: free hub count, k-means over sinks, then
//!   annealing on build and transport cost
//!
//! All implement [`AssignmentStrategy`]; [`Strategy`] selects one from
//! configuration. Relay subsets are searched in parallel with the `parallel`
//! feature, and the result is the same either way.

mod anneal;
mod clustered;
mod combinatorics;
mod exhaustive;
mod greedy;
mod hub_activation;
mod search;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::HubActivation;
use crate::network::Network;

pub use anneal::TEMPERATURE_FLOOR;
pub use clustered::{ClusteredAnnealingConfig, ClusteredAnnealingOptimizer};
pub use combinatorics::{Combinations, Permutations};
pub use exhaustive::{ExhaustiveConfig, ExhaustiveOptimizer};
pub use greedy::{GreedyConfig, GreedyOptimizer};
pub use hub_activation::{HubActivationConfig, HubActivationOptimizer, HubActivationOutcome};

/// Common contract of the assignment optimizers.
pub trait AssignmentStrategy {
    /// Short identifier used in logs and outcomes.
    fn name(&self) -> &'static str;

    /// Chooses relays and assigns the network's sources and sinks to them.
    ///
    /// The input network is not modified beyond its distance cache.
    fn optimize(&self, network: &Network) -> Result<AssignmentOutcome>;
}

/// Best assignment found by a strategy.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    /// Name of the strategy that produced this outcome.
    pub strategy: &'static str,
    /// All sources, the chosen relays, and all sinks, with the assignment
    /// and delivery paths set.
    pub network: Network,
    /// Objective value: total L1 distance, or total activation cost for
    /// [`HubActivationOptimizer`].
    pub total_cost: f64,
    /// Relay subsets that produced a candidate.
    pub evaluated: usize,
    /// Best cost after each annealing proposal of the winning subset; empty
    /// for the non-annealing strategies.
    pub history: Vec<f64>,
    /// Hub activation detail, for [`HubActivationOptimizer`] only.
    pub activation: Option<HubActivation>,
    /// Whether cancellation cut the search short.
    pub cancelled: bool,
}

impl AssignmentOutcome {
    /// Sum of source→relay and relay→sink distances of the assignment.
    pub fn total_distance(&self) -> Result<f64> {
        self.network.total_network_distance()
    }
}

/// One of the four optimizers, selected by configuration.
///
/// # Examples
///
/// ```
/// use u_logistics::optimizers::{AssignmentStrategy, Strategy};
///
/// let strategy: Strategy = serde_json::from_str(
///     r#"{ "strategy": "greedy", "relay_count": 2 }"#,
/// ).unwrap();
/// assert_eq!(strategy.name(), "greedy");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    Exhaustive(ExhaustiveConfig),
    Greedy(GreedyConfig),
    ClusteredAnnealing(ClusteredAnnealingConfig),
    HubActivation(HubActivationConfig),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::HubActivation(HubActivationConfig::default())
    }
}

impl AssignmentStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Exhaustive(_) => "exhaustive",
            Strategy::Greedy(_) => "greedy",
            Strategy::ClusteredAnnealing(_) => "clustered_annealing",
            Strategy::HubActivation(_) => "hub_activation",
        }
    }

    fn optimize(&self, network: &Network) -> Result<AssignmentOutcome> {
        match self {
            Strategy::Exhaustive(c) => ExhaustiveOptimizer::new(c.clone()).optimize(network),
            Strategy::Greedy(c) => GreedyOptimizer::new(c.clone()).optimize(network),
            Strategy::ClusteredAnnealing(c) => {
                ClusteredAnnealingOptimizer::new(c.clone()).optimize(network)
            }
            Strategy::HubActivation(c) => HubActivationOptimizer::new(c.clone()).optimize(network),
        }
    }
}
