//! Hub activation by k-means seeding and simulated annealing.
//!
//! # Algorithm
//!
//! The number of active hubs is a decision variable. For every candidate
//! count `k` and every `k`-subset of relays:
//!
//! 1. Cluster the sinks into `k` groups, `kmeans_restarts` times. An empty
//!    cluster takes the nearest sink from a cluster with more than one.
//! 2. Match clusters to hubs by the permutation minimising the summed L1
//!    distance from centroid to hub; keep the cheapest seeding.
//! 3. Anneal by moving single sinks between hubs. A sink is only moved off
//!    a hub that serves others, so no active hub is ever left empty.
//!
//! # Cost
//!
//! `Σ build cost + price · Σ_sources Σ_hubs d(source, hub) + price · Σ_sinks d(hub, sink)`
//!
//! Every source is charged to every active hub, so extra hubs pay both
//! their build cost and a full round of inbound transport.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use u_metaheur::sa::SaProblem;
use u_numflow::random::create_rng;

use super::anneal::{anneal_floored, FlooredSchedule};
use super::combinatorics::Permutations;
use super::search::relay_subsets;
use super::{AssignmentOutcome, AssignmentStrategy};
use crate::branch::{argmin, branch_seed, is_cancelled, resolve_seed, run_branches};
use crate::error::{LogisticsError, Result};
use crate::models::{CostBreakdown, HubActivation, Point};
use crate::network::{cluster_points, Clustering, KMeansConfig, Network};

/// Hub activation settings.
///
/// # Examples
///
/// ```
/// use u_logistics::optimizers::HubActivationConfig;
///
/// let config = HubActivationConfig::default()
///     .with_hub_counts(vec![1, 2])
///     .with_unit_transport_cost(2.5)
///     .with_seed(9);
/// assert!(config.validate().is_ok());
/// assert!(config.with_unit_transport_cost(-1.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubActivationConfig {
    /// Hub counts to try. `None` tries every count from 1 to the number of
    /// relays; counts outside that range are skipped.
    pub hub_counts: Option<Vec<usize>>,
    /// Price per distance unit of both transport legs.
    pub unit_transport_cost: f64,
    pub initial_temperature: f64,
    /// Multiplier applied after every proposal, in (0, 1].
    pub cooling_rate: f64,
    /// Proposals per relay subset.
    pub iterations: usize,
    /// K-means runs per relay subset; the cheapest seeding is annealed.
    pub kmeans_restarts: usize,
    pub kmeans: KMeansConfig,
    pub seed: Option<u64>,
    /// Cooperative cancellation, checked before each relay subset and each
    /// proposal.
    #[serde(skip)]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for HubActivationConfig {
    fn default() -> Self {
        Self {
            hub_counts: None,
            unit_transport_cost: 1.0,
            initial_temperature: 500.0,
            cooling_rate: 0.9,
            iterations: 1000,
            kmeans_restarts: 5,
            kmeans: KMeansConfig::default(),
            seed: None,
            cancel: None,
        }
    }
}

impl HubActivationConfig {
    pub fn with_hub_counts(mut self, counts: Vec<usize>) -> Self {
        self.hub_counts = Some(counts);
        self
    }

    pub fn with_unit_transport_cost(mut self, price: f64) -> Self {
        self.unit_transport_cost = price;
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

    pub fn with_kmeans_restarts(mut self, n: usize) -> Self {
        self.kmeans_restarts = n;
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
        if self.unit_transport_cost.is_nan() || self.unit_transport_cost < 0.0 {
            return Err(LogisticsError::InvalidParameter(format!(
                "unit_transport_cost must be non-negative, got {}",
                self.unit_transport_cost
            )));
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

/// Result of [`HubActivationOptimizer::optimize_hubs`].
#[derive(Debug, Clone)]
pub struct HubActivationOutcome {
    /// Cheapest activation over all hub counts.
    pub best: HubActivation,
    /// Cheapest activation of each hub count that produced one, in the
    /// order the counts were tried.
    pub evaluated: Vec<HubActivation>,
    /// Relay subsets that produced an activation.
    pub subsets_evaluated: usize,
    /// Best cost after each proposal of the winning subset.
    pub history: Vec<f64>,
    pub cancelled: bool,
}

/// Chooses how many hubs to open, which ones, and which sinks they serve.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Node, NodeRole};
/// use u_logistics::network::Network;
/// use u_logistics::optimizers::{HubActivationConfig, HubActivationOptimizer};
///
/// let network = Network::from_nodes(vec![
///     Node::new("M1", "M1", NodeRole::Source, 5.0, 0.0),
///     Node::new("H1", "H1", NodeRole::Relay, 0.0, 0.0),
///     Node::new("H2", "H2", NodeRole::Relay, 10.0, 0.0),
///     Node::new("D1", "D1", NodeRole::Sink, 0.0, 1.0),
///     Node::new("D2", "D2", NodeRole::Sink, 10.0, 1.0),
/// ])
/// .unwrap();
///
/// let optimizer = HubActivationOptimizer::new(HubActivationConfig::default().with_seed(1));
/// let outcome = optimizer.optimize_hubs(&network).unwrap();
/// assert_eq!(outcome.best.hub_count, 2);
/// assert_eq!(outcome.best.total_cost(), 12.0);
/// assert_eq!(outcome.evaluated.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HubActivationOptimizer {
    config: HubActivationConfig,
}

impl HubActivationOptimizer {
    pub fn new(config: HubActivationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HubActivationConfig {
        &self.config
    }

    /// Searches hub counts and relay subsets for the cheapest activation.
    ///
    /// # Errors
    ///
    /// - [`LogisticsError::InvalidParameter`] if the configuration is invalid
    /// - [`LogisticsError::NoFeasibleSolution`] if the network lacks relays,
    ///   sources or sinks, or no hub count in range yields an activation
    /// - [`LogisticsError::Cancelled`] if cancelled before any subset was
    ///   evaluated
    pub fn optimize_hubs(&self, network: &Network) -> Result<HubActivationOutcome> {
        let config = &self.config;
        config.validate()?;
        for (label, count) in [
            ("candidate hubs", network.relays().len()),
            ("sources", network.sources().len()),
            ("sinks", network.sinks().len()),
        ] {
            if count == 0 {
                return Err(LogisticsError::NoFeasibleSolution(format!(
                    "the network has no {label}"
                )));
            }
        }

        network.warm_distances();
        let relay_total = network.relays().len();
        let counts: Vec<usize> = match &config.hub_counts {
            Some(counts) => counts.clone(),
            None => (1..=relay_total).collect(),
        }
        .into_iter()
        .filter(|&k| k >= 1 && k <= relay_total)
        .collect();

        let mut tasks: Vec<Vec<usize>> = Vec::new();
        let mut groups: Vec<(usize, Range<usize>)> = Vec::with_capacity(counts.len());
        for &k in &counts {
            let start = tasks.len();
            tasks.extend(relay_subsets(network, k));
            groups.push((k, start..tasks.len()));
        }

        info!(
            event = "hub_activation_start",
            sources = network.sources().len(),
            relays = relay_total,
            sinks = network.sinks().len(),
            hub_counts = counts.len(),
            subsets = tasks.len(),
        );

        let base_seed = resolve_seed(config.seed);
        let mut results: Vec<Option<SubsetResult>> = run_branches(tasks.len(), |t| -> Result<_> {
            if is_cancelled(&config.cancel) {
                return Ok(None);
            }
            let mut rng = create_rng(branch_seed(base_seed, t));
            let result = self.evaluate_subset(network, &tasks[t], &mut rng)?;
            match &result {
                Some(r) => debug!(
                    event = "hub_subset_evaluated",
                    hub_count = tasks[t].len(),
                    subset = t,
                    total = r.activation.total_cost(),
                ),
                None => debug!(
                    event = "hub_subset_skipped",
                    hub_count = tasks[t].len(),
                    subset = t,
                ),
            }
            Ok(result)
        })
        .into_iter()
        .collect::<Result<_>>()?;

        let cancelled = is_cancelled(&config.cancel);
        let cost_of = |t: usize| {
            results[t]
                .as_ref()
                .map_or(f64::NAN, |r| r.activation.total_cost())
        };

        // Cheapest subset of each count, then cheapest count.
        let mut per_count: Vec<usize> = Vec::with_capacity(groups.len());
        for (k, range) in &groups {
            match argmin(range.clone().map(cost_of)) {
                Some(offset) => {
                    let t = range.start + offset;
                    debug!(event = "hub_count_evaluated", hub_count = k, total = cost_of(t));
                    per_count.push(t);
                }
                None => debug!(event = "hub_count_infeasible", hub_count = k),
            }
        }

        let Some(winner) = argmin(per_count.iter().map(|&t| cost_of(t))) else {
            return Err(if cancelled {
                LogisticsError::Cancelled
            } else {
                LogisticsError::NoFeasibleSolution(
                    "no hub count in range yields an activation".into(),
                )
            });
        };
        let winner = per_count[winner];

        let evaluated: Vec<HubActivation> = per_count
            .iter()
            .filter_map(|&t| results[t].as_ref().map(|r| r.activation.clone()))
            .collect();
        let subsets_evaluated = results.iter().flatten().count();
        let best = results[winner].take().ok_or_else(|| {
            LogisticsError::NoFeasibleSolution("winning subset has no activation".into())
        })?;

        info!(
            event = "hub_activation_end",
            hub_count = best.activation.hub_count,
            best_total = best.activation.total_cost(),
            subsets_evaluated,
            cancelled,
        );

        Ok(HubActivationOutcome {
            best: best.activation,
            evaluated,
            subsets_evaluated,
            history: best.history,
            cancelled,
        })
    }

    /// Seeds and anneals one relay subset.
    ///
    /// `None` when there are fewer sinks than hubs.
    fn evaluate_subset<R: Rng>(
        &self,
        network: &Network,
        subset: &[usize],
        rng: &mut R,
    ) -> Result<Option<SubsetResult>> {
        let config = &self.config;
        let k = subset.len();
        let sinks = network.sinks();
        if sinks.len() < k {
            return Ok(None);
        }

        let problem = HubProblem::new(network, subset, config.unit_transport_cost);
        let sink_points: Vec<Point> = sinks
            .iter()
            .map(|&s| network.node_at(s).location())
            .collect();
        let hub_points: Vec<Point> = subset
            .iter()
            .map(|&h| network.node_at(h).location())
            .collect();

        let mut seeding: Option<(Vec<usize>, f64)> = None;
        for _ in 0..config.kmeans_restarts.max(1) {
            let mut clustering = cluster_points(&sink_points, k, &config.kmeans, rng)?;
            fill_empty_clusters(&mut clustering, &sink_points);
            if clustering.clusters.iter().any(Vec::is_empty) {
                continue;
            }

            let mut matching: Vec<usize> = (0..k).collect();
            let mut best_score = f64::INFINITY;
            for perm in Permutations::new(k) {
                let score: f64 = clustering
                    .centroids
                    .iter()
                    .zip(&perm)
                    .map(|(c, &h)| c.manhattan_distance(&hub_points[h]))
                    .sum();
                if score < best_score {
                    best_score = score;
                    matching = perm;
                }
            }

            let mut hub_of = vec![0; sinks.len()];
            for (cluster, members) in clustering.clusters.iter().enumerate() {
                for &m in members {
                    hub_of[m] = matching[cluster];
                }
            }
            let cost = problem.cost(&hub_of);
            if seeding.as_ref().is_none_or(|(_, best)| cost < *best) {
                seeding = Some((hub_of, cost));
            }
        }

        let Some((initial, _)) = seeding else {
            return Ok(None);
        };
        let result = anneal_floored(&problem, initial, config.schedule(), &config.cancel, rng);

        Ok(Some(SubsetResult {
            activation: problem.to_activation(&result.best),
            history: result.cost_history,
        }))
    }
}

impl AssignmentStrategy for HubActivationOptimizer {
    fn name(&self) -> &'static str {
        "hub_activation"
    }

    /// Runs [`HubActivationOptimizer::optimize_hubs`] and expresses the best
    /// activation as an assignment on the network restricted to the active
    /// hubs. `total_cost` is the activation's total cost.
    fn optimize(&self, network: &Network) -> Result<AssignmentOutcome> {
        let outcome = self.optimize_hubs(network)?;
        let mut chosen = network.filtered_copy(&outcome.best.active_hubs)?;
        chosen.set_assignment(outcome.best.to_assignment())?;
        Ok(AssignmentOutcome {
            strategy: self.name(),
            network: chosen,
            total_cost: outcome.best.total_cost(),
            evaluated: outcome.subsets_evaluated,
            history: outcome.history,
            activation: Some(outcome.best),
            cancelled: outcome.cancelled,
        })
    }
}

/// Gives every empty cluster the member nearest its centroid, taken from a
/// cluster with more than one member. Succeeds whenever there are at least
/// as many points as clusters. Centroids of both clusters are recomputed.
fn fill_empty_clusters(clustering: &mut Clustering, points: &[Point]) {
    while let Some(empty) = clustering.clusters.iter().position(Vec::is_empty) {
        let target = clustering.centroids[empty];
        let mut donor: Option<(usize, usize, f64)> = None;
        for (c, members) in clustering.clusters.iter().enumerate() {
            if members.len() < 2 {
                continue;
            }
            for (pos, &m) in members.iter().enumerate() {
                let d = points[m].manhattan_distance(&target);
                if donor.is_none_or(|(_, _, best)| d < best) {
                    donor = Some((c, pos, d));
                }
            }
        }
        let Some((from, pos, _)) = donor else {
            return;
        };
        let moved = clustering.clusters[from].remove(pos);
        clustering.clusters[empty].push(moved);
        clustering.centroids[empty] = points[moved];
        clustering.centroids[from] = centroid(&clustering.clusters[from], points);
    }
}

fn centroid(members: &[usize], points: &[Point]) -> Point {
    let n = members.len() as f64;
    let (sx, sy) = members
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &m| (sx + points[m].x, sy + points[m].y));
    Point::new(sx / n, sy / n)
}

struct SubsetResult {
    activation: HubActivation,
    history: Vec<f64>,
}

/// Sink-to-hub assignment of one relay subset. A solution holds, for each
/// sink in network order, the position of its hub in the subset.
struct HubProblem<'a> {
    network: &'a Network,
    hubs: &'a [usize],
    price: f64,
    activation: f64,
    source_transport: f64,
}

impl<'a> HubProblem<'a> {
    fn new(network: &'a Network, hubs: &'a [usize], price: f64) -> Self {
        let activation = hubs.iter().map(|&h| network.node_at(h).build_cost()).sum();
        let source_transport = hubs
            .iter()
            .flat_map(|&h| network.sources().iter().map(move |&s| (s, h)))
            .map(|(s, h)| price * network.distance_between(s, h))
            .sum();
        Self {
            network,
            hubs,
            price,
            activation,
            source_transport,
        }
    }

    fn breakdown(&self, hub_of: &[usize]) -> CostBreakdown {
        let sink_transport = self
            .network
            .sinks()
            .iter()
            .zip(hub_of)
            .map(|(&s, &h)| self.price * self.network.distance_between(self.hubs[h], s))
            .sum();
        CostBreakdown {
            activation: self.activation,
            source_transport: self.source_transport,
            sink_transport,
        }
    }

    fn to_activation(&self, hub_of: &[usize]) -> HubActivation {
        let net = self.network;
        let sink_assignments: BTreeMap<String, String> = net
            .sinks()
            .iter()
            .zip(hub_of)
            .map(|(&s, &h)| {
                (
                    net.node_at(s).id().to_string(),
                    net.node_at(self.hubs[h]).id().to_string(),
                )
            })
            .collect();
        HubActivation {
            hub_count: self.hubs.len(),
            active_hubs: self
                .hubs
                .iter()
                .map(|&h| net.node_at(h).id().to_string())
                .collect(),
            sink_assignments,
            sources: net
                .sources()
                .iter()
                .map(|&s| net.node_at(s).id().to_string())
                .collect(),
            unit_transport_cost: self.price,
            cost: self.breakdown(hub_of),
        }
    }
}

impl SaProblem for HubProblem<'_> {
    type Solution = Vec<usize>;

    fn initial_solution<R: Rng>(&self, _rng: &mut R) -> Vec<usize> {
        vec![0; self.network.sinks().len()]
    }

    fn cost(&self, hub_of: &Vec<usize>) -> f64 {
        self.breakdown(hub_of).total()
    }

    fn neighbor<R: Rng>(&self, hub_of: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        let k = self.hubs.len();
        let mut next = hub_of.clone();
        if k < 2 {
            return next;
        }

        let mut served = vec![0usize; k];
        for &h in hub_of {
            served[h] += 1;
        }
        let movable: Vec<usize> = (0..hub_of.len()).filter(|&i| served[hub_of[i]] > 1).collect();
        if movable.is_empty() {
            return next;
        }

        let sink = movable[rng.random_range(0..movable.len())];
        let mut target = rng.random_range(0..k - 1);
        if target >= next[sink] {
            target += 1;
        }
        next[sink] = target;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, NodeRole};
    use crate::optimizers::tests::example_network;
    use proptest::prelude::*;

    fn two_sites(build_cost: f64) -> Network {
        Network::from_nodes(vec![
            Node::new("M1", "M1", NodeRole::Source, 5.0, 0.0),
            Node::new("H1", "H1", NodeRole::Relay, 0.0, 0.0).with_build_cost(build_cost),
            Node::new("H2", "H2", NodeRole::Relay, 10.0, 0.0).with_build_cost(build_cost),
            Node::new("D1", "D1", NodeRole::Sink, 0.0, 1.0),
            Node::new("D2", "D2", NodeRole::Sink, 10.0, 1.0),
        ])
        .expect("valid nodes")
    }

    fn fast(seed: u64) -> HubActivationConfig {
        HubActivationConfig::default()
            .with_iterations(200)
            .with_seed(seed)
    }

    fn assert_no_empty_hub(activation: &HubActivation) {
        assert_eq!(activation.active_hubs.len(), activation.hub_count);
        for hub in &activation.active_hubs {
            assert!(activation.sinks_served_by(hub) >= 1, "{hub} serves no sink");
        }
    }

    #[test]
    fn test_free_hubs_open_both() {
        let outcome = HubActivationOptimizer::new(fast(1))
            .optimize_hubs(&two_sites(0.0))
            .expect("feasible");
        assert_eq!(outcome.best.hub_count, 2);
        assert!((outcome.best.cost.source_transport - 10.0).abs() < 1e-10);
        assert!((outcome.best.cost.sink_transport - 2.0).abs() < 1e-10);
        assert_eq!(outcome.best.sink_assignments["D1"], "H1");
        assert_eq!(outcome.best.sink_assignments["D2"], "H2");
        assert_eq!(outcome.subsets_evaluated, 3);
    }

    #[test]
    fn test_expensive_hubs_open_one() {
        let outcome = HubActivationOptimizer::new(fast(1))
            .optimize_hubs(&two_sites(100.0))
            .expect("feasible");
        // 100 + 5 + (1 + 11), and H1 wins the tie with H2
        assert_eq!(outcome.best.hub_count, 1);
        assert_eq!(outcome.best.active_hubs, vec!["H1".to_string()]);
        assert!((outcome.best.total_cost() - 117.0).abs() < 1e-10);
        assert_eq!(outcome.evaluated.len(), 2);
        assert!((outcome.evaluated[1].total_cost() - 212.0).abs() < 1e-10);
    }

    #[test]
    fn test_price_scales_transport() {
        let outcome = HubActivationOptimizer::new(fast(1).with_unit_transport_cost(2.0))
            .optimize_hubs(&two_sites(0.0))
            .expect("feasible");
        assert!((outcome.best.total_cost() - 24.0).abs() < 1e-10);
        assert_eq!(outcome.best.unit_transport_cost, 2.0);
    }

    #[test]
    fn test_example_has_no_empty_hub() {
        let network = example_network();
        let outcome = HubActivationOptimizer::new(fast(5))
            .optimize_hubs(&network)
            .expect("feasible");
        assert_no_empty_hub(&outcome.best);
        for activation in &outcome.evaluated {
            assert_no_empty_hub(activation);
        }
        assert_eq!(outcome.evaluated.len(), 3);
    }

    #[test]
    fn test_history_non_increasing() {
        let outcome = HubActivationOptimizer::new(fast(8))
            .optimize_hubs(&example_network())
            .expect("feasible");
        assert!(!outcome.history.is_empty());
        for w in outcome.history.windows(2) {
            assert!(w[1] <= w[0]);
        }
        let last = outcome.history.last().copied().unwrap_or(f64::NAN);
        assert!((last - outcome.best.total_cost()).abs() < 1e-9);
    }

    #[test]
    fn test_counts_above_sinks_are_skipped() {
        let network = two_sites(0.0);
        let err = HubActivationOptimizer::new(fast(1).with_hub_counts(vec![0, 3, 7]))
            .optimize_hubs(&network)
            .unwrap_err();
        assert!(matches!(err, LogisticsError::NoFeasibleSolution(_)));

        let one_sink =
            Network::from_nodes(network.nodes().iter().filter(|n| n.id() != "D2").cloned())
                .expect("valid nodes");
        let outcome = HubActivationOptimizer::new(fast(1))
            .optimize_hubs(&one_sink)
            .expect("one hub fits");
        assert_eq!(outcome.best.hub_count, 1);
        assert_eq!(outcome.evaluated.len(), 1);
    }

    #[test]
    fn test_colocated_sinks_fill_every_hub() {
        let network = Network::from_nodes(vec![
            Node::new("M1", "M1", NodeRole::Source, 5.0, 5.0),
            Node::new("H1", "H1", NodeRole::Relay, 0.0, 0.0),
            Node::new("H2", "H2", NodeRole::Relay, 10.0, 0.0),
            Node::new("D1", "D1", NodeRole::Sink, 1.0, 1.0),
            Node::new("D2", "D2", NodeRole::Sink, 1.0, 1.0),
        ])
        .expect("valid nodes");
        let outcome = HubActivationOptimizer::new(fast(1).with_hub_counts(vec![2]))
            .optimize_hubs(&network)
            .expect("two hubs can each serve one sink");
        assert_eq!(outcome.best.hub_count, 2);
        assert_no_empty_hub(&outcome.best);
    }

    #[test]
    fn test_fill_empty_clusters_moves_nearest_member() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(9.0, 0.0),
        ];
        let mut clustering = Clustering {
            clusters: vec![vec![0, 1, 2], vec![]],
            centroids: vec![Point::new(10.0 / 3.0, 0.0), Point::new(10.0, 0.0)],
            iterations: 1,
        };
        fill_empty_clusters(&mut clustering, &points);
        assert_eq!(clustering.clusters, vec![vec![0, 1], vec![2]]);
        assert_eq!(clustering.centroids[0], Point::new(0.5, 0.0));
        assert_eq!(clustering.centroids[1], Point::new(9.0, 0.0));

        let mut stacked = Clustering {
            clusters: vec![vec![0, 1], vec![], vec![]],
            centroids: vec![Point::new(0.0, 0.0); 3],
            iterations: 1,
        };
        fill_empty_clusters(&mut stacked, &[Point::new(0.0, 0.0), Point::new(0.0, 0.0)]);
        assert_eq!(stacked.clusters.iter().filter(|c| c.is_empty()).count(), 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = HubActivationOptimizer::new(fast(1).with_unit_transport_cost(-0.5))
            .optimize_hubs(&two_sites(0.0))
            .unwrap_err();
        assert!(matches!(err, LogisticsError::InvalidParameter(_)));

        let no_sinks = Network::from_nodes(vec![
            Node::new("M1", "M1", NodeRole::Source, 0.0, 0.0),
            Node::new("H1", "H1", NodeRole::Relay, 1.0, 0.0),
        ])
        .expect("valid nodes");
        let err = HubActivationOptimizer::default()
            .optimize_hubs(&no_sinks)
            .unwrap_err();
        assert!(matches!(err, LogisticsError::NoFeasibleSolution(_)));
    }

    #[test]
    fn test_strategy_outcome() {
        let outcome = HubActivationOptimizer::new(fast(1))
            .optimize(&two_sites(0.0))
            .expect("feasible");
        assert_eq!(outcome.strategy, "hub_activation");
        assert_eq!(outcome.network.relays().len(), 2);
        assert_eq!(outcome.network.assignment().source_pairs().count(), 2);
        assert_eq!(outcome.network.delivery_paths().len(), 2);
        assert!(outcome.activation.is_some());
    }

    #[test]
    fn test_neighbor_keeps_every_hub_served() {
        let network = example_network();
        let hubs = network.relays().to_vec();
        let problem = HubProblem::new(&network, &hubs, 1.0);
        let mut rng = create_rng(4);
        let mut state = vec![0, 1, 2];
        for _ in 0..100 {
            state = problem.neighbor(&state, &mut rng);
            assert_eq!(state, vec![0, 1, 2]);
        }
        let mut state = vec![0, 0, 1];
        for _ in 0..100 {
            state = problem.neighbor(&state, &mut rng);
            let mut served = [0; 3];
            for &h in &state {
                served[h] += 1;
            }
            assert!(served.iter().filter(|&&n| n > 0).count() >= 2);
        }
    }

    fn arb_network() -> impl Strategy<Value = Network> {
        let coord = || (0.0..30.0f64, 0.0..30.0f64);
        (
            proptest::collection::vec(coord(), 1..3),
            proptest::collection::vec((coord(), 0.0..50.0f64), 1..4),
            proptest::collection::vec(coord(), 1..7),
        )
            .prop_map(|(sources, relays, sinks)| {
                let mut nodes = Vec::new();
                for (i, (x, y)) in sources.into_iter().enumerate() {
                    nodes.push(Node::new(format!("M{i}"), "source", NodeRole::Source, x, y));
                }
                for (i, ((x, y), cost)) in relays.into_iter().enumerate() {
                    nodes.push(
                        Node::new(format!("H{i}"), "hub", NodeRole::Relay, x, y)
                            .with_build_cost(cost),
                    );
                }
                for (i, (x, y)) in sinks.into_iter().enumerate() {
                    nodes.push(Node::new(format!("D{i}"), "store", NodeRole::Sink, x, y));
                }
                Network::from_nodes(nodes).expect("generated nodes are valid")
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_no_empty_hub(network in arb_network(), seed in 0u64..1000) {
            let config = HubActivationConfig::default()
                .with_iterations(100)
                .with_kmeans_restarts(2)
                .with_seed(seed);
            let outcome = HubActivationOptimizer::new(config)
                .optimize_hubs(&network)
                .expect("at least one hub fits");
            for activation in std::iter::once(&outcome.best).chain(&outcome.evaluated) {
                for hub in &activation.active_hubs {
                    prop_assert!(activation.sinks_served_by(hub) >= 1);
                }
                prop_assert_eq!(activation.sink_assignments.len(), network.sinks().len());
            }
        }
    }
}
