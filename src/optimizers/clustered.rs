//! Source clustering followed by simulated annealing.
//!
//! # Algorithm
//!
//! For each relay subset:
//!
//! 1. Cluster the sources with k-means into `source_clusters` groups.
//! 2. Send each cluster to the relay of the subset nearest its centroid,
//!    preferring relays no earlier cluster took.
//! 3. Send each sink to the nearest of the relays actually used.
//! 4. Anneal: swap the relays of two sources, or move one sink to another
//!    used relay, accepting by the Metropolis rule on total distance.
//!
//! The subset with the lowest annealed distance wins.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use u_metaheur::sa::SaProblem;
use u_numflow::random::create_rng;

use super::anneal::{anneal_floored, FlooredSchedule};
use super::search::{nearest_of, search_subsets, Candidate};
use super::{AssignmentOutcome, AssignmentStrategy};
use crate::branch::{branch_seed, resolve_seed};
use crate::error::{LogisticsError, Result};
use crate::models::AssignmentSolution;
use crate::network::{KMeansConfig, Network};

/// Clustered annealing settings.
///
/// # Examples
///
/// ```
/// use u_logistics::optimizers::ClusteredAnnealingConfig;
///
/// let config = ClusteredAnnealingConfig::default()
///     .with_source_clusters(2)
///     .with_iterations(500)
///     .with_seed(1);
/// assert!(config.validate().is_ok());
/// assert!(config.with_cooling_rate(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteredAnnealingConfig {
    /// Size of the relay subset.
    pub relay_count: usize,
    /// Number of k-means clusters over the sources (clamped to the source
    /// count).
    pub source_clusters: usize,
    pub initial_temperature: f64,
    /// Multiplier applied after every proposal, in (0, 1].
    pub cooling_rate: f64,
    /// Proposals per relay subset.
    pub iterations: usize,
    pub kmeans: KMeansConfig,
    /// Random seed. `None` draws one per run.
    pub seed: Option<u64>,
    #[serde(skip)]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ClusteredAnnealingConfig {
    fn default() -> Self {
        Self {
            relay_count: 3,
            source_clusters: 3,
            initial_temperature: 1000.0,
            cooling_rate: 0.95,
            iterations: 1000,
            kmeans: KMeansConfig::default(),
            seed: None,
            cancel: None,
        }
    }
}

impl ClusteredAnnealingConfig {
    pub fn with_relay_count(mut self, k: usize) -> Self {
        self.relay_count = k;
        self
    }

    pub fn with_source_clusters(mut self, k: usize) -> Self {
        self.source_clusters = k;
        self
    }

    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_kmeans(mut self, kmeans: KMeansConfig) -> Self {
        self.kmeans = kmeans;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.relay_count == 0 {
            return Err(LogisticsError::InvalidParameter(
                "relay_count must be positive".into(),
            ));
        }
        if self.source_clusters == 0 {
            return Err(LogisticsError::InvalidParameter(
                "source_clusters must be positive".into(),
            ));
        }
        if self.initial_temperature.is_nan() {
            return Err(LogisticsError::InvalidParameter(
                "initial_temperature must be a number".into(),
            ));
        }
        if self.cooling_rate.is_nan() || self.cooling_rate <= 0.0 || self.cooling_rate > 1.0 {
            return Err(LogisticsError::InvalidParameter(format!(
                "cooling_rate must be in (0, 1], got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }

    fn schedule(&self) -> FlooredSchedule {
        FlooredSchedule {
            initial_temperature: self.initial_temperature,
            cooling_rate: self.cooling_rate,
            iterations: self.iterations,
        }
    }
}

/// K-means seeded annealing over all relay subsets.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Node, NodeRole};
/// use u_logistics::network::Network;
/// use u_logistics::optimizers::{
///     AssignmentStrategy, ClusteredAnnealingConfig, ClusteredAnnealingOptimizer,
/// };
///
/// let network = Network::from_nodes(vec![
///     Node::new("M1", "M1", NodeRole::Source, 0.0, 0.0),
///     Node::new("M2", "M2", NodeRole::Source, 10.0, 0.0),
///     Node::new("W1", "W1", NodeRole::Relay, 1.0, 0.0),
///     Node::new("W2", "W2", NodeRole::Relay, 9.0, 0.0),
///     Node::new("S1", "S1", NodeRole::Sink, 1.0, 2.0),
///     Node::new("S2", "S2", NodeRole::Sink, 9.0, 2.0),
/// ])
/// .unwrap();
///
/// let config = ClusteredAnnealingConfig::default()
///     .with_relay_count(2)
///     .with_source_clusters(2)
///     .with_iterations(200)
///     .with_seed(3);
/// let outcome = ClusteredAnnealingOptimizer::new(config).optimize(&network).unwrap();
/// assert_eq!(outcome.total_cost, 6.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClusteredAnnealingOptimizer {
    config: ClusteredAnnealingConfig,
}

impl ClusteredAnnealingOptimizer {
    pub fn new(config: ClusteredAnnealingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusteredAnnealingConfig {
        &self.config
    }
}

impl AssignmentStrategy for ClusteredAnnealingOptimizer {
    fn name(&self) -> &'static str {
        "clustered_annealing"
    }

    /// # Errors
    ///
    /// - [`LogisticsError::InvalidParameter`] if the configuration is invalid
    /// - [`LogisticsError::InvalidTopology`] if there are no sources or fewer
    ///   relays than `relay_count`
    fn optimize(&self, network: &Network) -> Result<AssignmentOutcome> {
        let config = &self.config;
        config.validate()?;
        if network.sources().is_empty() {
            return Err(LogisticsError::InvalidTopology(
                "at least one source is required".into(),
            ));
        }
        if network.relays().len() < config.relay_count {
            return Err(LogisticsError::InvalidTopology(format!(
                "expected at least {} relays, found {}",
                config.relay_count,
                network.relays().len()
            )));
        }

        let base_seed = resolve_seed(config.seed);
        search_subsets(
            self.name(),
            network,
            config.relay_count,
            &config.cancel,
            |b, subset| {
                let mut rng = create_rng(branch_seed(base_seed, b));
                anneal_subset(network, subset, config, &mut rng)
            },
        )
    }
}

fn anneal_subset<R: Rng>(
    network: &Network,
    subset: &[usize],
    config: &ClusteredAnnealingConfig,
    rng: &mut R,
) -> Result<Candidate> {
    let sources = network.sources();
    let k = config.source_clusters.clamp(1, sources.len());
    let (clusters, centroids) = network.cluster_entities(sources, k, &config.kmeans, rng)?;

    let mut source_relay = vec![subset[0]; sources.len()];
    let mut used: Vec<usize> = Vec::new();
    for (members, centroid) in clusters.iter().zip(&centroids) {
        if members.is_empty() {
            continue;
        }
        let free: Vec<usize> = subset.iter().copied().filter(|r| !used.contains(r)).collect();
        let pool = if free.is_empty() { subset } else { &free[..] };
        let mut relay = pool[0];
        let mut best_d = f64::INFINITY;
        for &r in pool {
            let d = network.node_at(r).location().manhattan_distance(centroid);
            if d < best_d {
                best_d = d;
                relay = r;
            }
        }
        if !used.contains(&relay) {
            used.push(relay);
        }
        for &m in members {
            if let Some(pos) = sources.iter().position(|&s| s == m) {
                source_relay[pos] = relay;
            }
        }
    }

    let sink_relay: Vec<usize> = network
        .sinks()
        .iter()
        .map(|&s| nearest_of(network, s, &used))
        .collect();

    let problem = ClusterProblem {
        network,
        used,
        initial: ClusterState {
            source_relay,
            sink_relay,
        },
    };
    let initial = problem.initial.clone();
    let result = anneal_floored(&problem, initial, config.schedule(), &config.cancel, rng);

    Ok(Candidate {
        assignment: problem.to_assignment(&result.best),
        total: result.best_cost,
        history: result.cost_history,
    })
}

/// Relay of every source and every sink, parallel to the network's role
/// lists.
#[derive(Debug, Clone, PartialEq)]
struct ClusterState {
    source_relay: Vec<usize>,
    sink_relay: Vec<usize>,
}

struct ClusterProblem<'a> {
    network: &'a Network,
    used: Vec<usize>,
    initial: ClusterState,
}

impl ClusterProblem<'_> {
    fn to_assignment(&self, state: &ClusterState) -> AssignmentSolution {
        let net = self.network;
        let mut assignment = AssignmentSolution::new();
        for (&s, &r) in net.sources().iter().zip(&state.source_relay) {
            assignment.link_source(net.node_at(s).id(), net.node_at(r).id());
        }
        for (&s, &r) in net.sinks().iter().zip(&state.sink_relay) {
            assignment.link_sink(net.node_at(s).id(), net.node_at(r).id());
        }
        assignment
    }
}

impl SaProblem for ClusterProblem<'_> {
    type Solution = ClusterState;

    fn initial_solution<R: Rng>(&self, _rng: &mut R) -> ClusterState {
        self.initial.clone()
    }

    fn cost(&self, state: &ClusterState) -> f64 {
        let net = self.network;
        let sources: f64 = net
            .sources()
            .iter()
            .zip(&state.source_relay)
            .map(|(&s, &r)| net.distance_between(s, r))
            .sum();
        let sinks: f64 = net
            .sinks()
            .iter()
            .zip(&state.sink_relay)
            .map(|(&s, &r)| net.distance_between(s, r))
            .sum();
        sources + sinks
    }

    fn neighbor<R: Rng>(&self, state: &ClusterState, rng: &mut R) -> ClusterState {
        let mut next = state.clone();
        let n_sources = next.source_relay.len();
        let n_sinks = next.sink_relay.len();

        if n_sources > 1 && (n_sinks == 0 || rng.random_bool(0.5)) {
            let pair = rand::seq::index::sample(rng, n_sources, 2);
            next.source_relay.swap(pair.index(0), pair.index(1));
        } else if n_sinks > 0 && self.used.len() > 1 {
            let sink = rng.random_range(0..n_sinks);
            let current = next.sink_relay[sink];
            let others: Vec<usize> = self.used.iter().copied().filter(|&r| r != current).collect();
            next.sink_relay[sink] = others[rng.random_range(0..others.len())];
        }
        next
    }
}
