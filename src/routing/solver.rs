//! Simulated annealing solver for capacitated multi-depot routing.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use u_metaheur::sa::{CoolingSchedule, SaConfig, SaResult, SaRunner};
use u_numflow::random::create_rng;

use super::instance::RoutingInstance;
use super::problem::RoutingProblem;
use crate::branch::{argmin, branch_seed, resolve_seed, run_branches};
use crate::constructive::sweep;
use crate::error::{LogisticsError, Result};
use crate::evaluation::{evaluate_routes, DepotRoutes, RoutingCost};
use crate::models::VehiclePlan;

/// Routing annealer settings.
///
/// # Examples
///
/// ```
/// use u_logistics::routing::RoutingConfig;
///
/// let config = RoutingConfig::default()
///     .with_cooling_rate(0.99)
///     .with_restarts(4)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert!(RoutingConfig::default().with_min_temperature(500.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Geometric cooling factor per temperature step, in (0, 1).
    pub cooling_rate: f64,
    /// The search stops once the temperature drops to this floor.
    pub min_temperature: f64,
    /// Proposals evaluated at each temperature.
    pub iterations_per_temperature: usize,
    /// Hard cap on proposals (0 = none).
    pub max_iterations: usize,
    /// Random moves tried per proposal before keeping the current solution.
    pub neighbor_attempts: usize,
    /// Random moves tried to repair an infeasible initial solution.
    pub repair_attempts: usize,
    /// Flat penalty applied when depot legs of two vehicles cross.
    pub crossing_penalty: f64,
    /// Independent annealing runs; the cheapest plan wins.
    pub restarts: usize,
    /// Random seed. `None` draws one per solve.
    pub seed: Option<u64>,
    /// Cooperative cancellation, checked once per temperature step.
    #[serde(skip)]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.995,
            min_temperature: 1.0,
            iterations_per_temperature: 30,
            max_iterations: 20_000,
            neighbor_attempts: 100,
            repair_attempts: 1000,
            crossing_penalty: 20_000.0,
            restarts: 1,
            seed: None,
            cancel: None,
        }
    }
}

impl RoutingConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_neighbor_attempts(mut self, n: usize) -> Self {
        self.neighbor_attempts = n;
        self
    }

    pub fn with_repair_attempts(mut self, n: usize) -> Self {
        self.repair_attempts = n;
        self
    }

    pub fn with_crossing_penalty(mut self, penalty: f64) -> Self {
        self.crossing_penalty = penalty;
        self
    }

    pub fn with_restarts(mut self, n: usize) -> Self {
        self.restarts = n;
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
        if !self.min_temperature.is_finite() || self.min_temperature <= 0.0 {
            return Err(LogisticsError::InvalidParameter(format!(
                "min_temperature must be positive and finite, got {}",
                self.min_temperature
            )));
        }
        if !self.initial_temperature.is_finite() {
            return Err(LogisticsError::InvalidParameter(format!(
                "initial_temperature must be finite, got {}",
                self.initial_temperature
            )));
        }
        if self.initial_temperature <= self.min_temperature {
            return Err(LogisticsError::InvalidParameter(format!(
                "initial_temperature ({}) must exceed min_temperature ({})",
                self.initial_temperature, self.min_temperature
            )));
        }
        if self.cooling_rate.is_nan() || self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(LogisticsError::InvalidParameter(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if self.iterations_per_temperature == 0 {
            return Err(LogisticsError::InvalidParameter(
                "iterations_per_temperature must be positive".into(),
            ));
        }
        if self.restarts == 0 {
            return Err(LogisticsError::InvalidParameter(
                "restarts must be positive".into(),
            ));
        }
        if !self.crossing_penalty.is_finite() || self.crossing_penalty < 0.0 {
            return Err(LogisticsError::InvalidParameter(format!(
                "crossing_penalty must be non-negative, got {}",
                self.crossing_penalty
            )));
        }
        Ok(())
    }

    fn sa_config(&self, seed: u64) -> SaConfig {
        SaConfig::default()
            .with_initial_temperature(self.initial_temperature)
            .with_min_temperature(self.min_temperature)
            .with_cooling(CoolingSchedule::Geometric {
                alpha: self.cooling_rate,
            })
            .with_iterations_per_temperature(self.iterations_per_temperature)
            .with_max_iterations(self.max_iterations)
            .with_seed(seed)
    }
}

/// Best plan found by [`RoutingSolver`].
#[derive(Debug, Clone)]
pub struct RoutingOutcome {
    /// Ordered demand nodes per depot.
    pub routes: DepotRoutes,
    /// The routes split into vehicles.
    pub plan: VehiclePlan,
    /// Cost breakdown of `plan`.
    pub cost: RoutingCost,
    /// Best cost sampled during the winning run (non-increasing).
    pub history: Vec<f64>,
    /// Proposals evaluated by the winning run.
    pub iterations: usize,
    /// Accepted proposals of the winning run.
    pub accepted_moves: usize,
    /// Temperature when the winning run stopped.
    pub final_temperature: f64,
    /// Whether the search was cut short by the cancellation flag.
    pub cancelled: bool,
}

impl RoutingOutcome {
    /// Total cost of the plan.
    pub fn total_cost(&self) -> f64 {
        self.cost.total
    }
}

/// Capacitated multi-depot routing by simulated annealing.
///
/// Starts from the sweep construction, repairs it with random moves if the
/// oracle rejects it, then anneals over per-depot routes. Every proposal is
/// checked by the oracle, so the returned plan always respects vehicle
/// capacity and the fleet bound.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Fleet, Point, Pricing};
/// use u_logistics::routing::{RoutingConfig, RoutingInstance, RoutingSolver};
///
/// let nodes = vec![
///     (Point::new(1.0, 1.0), 3.0),
///     (Point::new(-1.0, 1.0), 3.0),
///     (Point::new(-1.0, -1.0), 3.0),
///     (Point::new(1.0, -1.0), 3.0),
/// ];
/// let instance = RoutingInstance::new(
///     vec![Point::new(0.0, 0.0)],
///     nodes,
///     Fleet::new(6.0, 2),
///     Pricing::default(),
/// )
/// .unwrap();
///
/// let outcome = RoutingSolver::new(RoutingConfig::default().with_seed(7))
///     .solve(&instance)
///     .unwrap();
/// assert_eq!(outcome.plan.num_vehicles(), 2);
/// assert_eq!(outcome.plan.num_served(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoutingSolver {
    config: RoutingConfig,
}

impl RoutingSolver {
    /// Creates a solver.
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// The solver's configuration.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Solves the instance.
    ///
    /// # Errors
    ///
    /// - [`LogisticsError::InvalidParameter`] if the configuration is invalid
    /// - [`LogisticsError::InfeasibleRouting`] if no feasible starting
    ///   solution is found within the repair budget
    pub fn solve(&self, instance: &RoutingInstance) -> Result<RoutingOutcome> {
        let config = &self.config;
        config.validate()?;
        let base_seed = resolve_seed(config.seed);

        info!(
            event = "routing_start",
            depots = instance.num_depots(),
            demand_points = instance.demand_nodes().len(),
            fleet = instance.fleet().count(),
            capacity = instance.capacity(),
            restarts = config.restarts,
        );

        let initial = self.initial_routes(instance, base_seed)?;
        let problem = RoutingProblem::new(
            instance,
            initial,
            config.crossing_penalty,
            config.neighbor_attempts,
        );

        let mut runs: Vec<SaResult<DepotRoutes>> = run_branches(config.restarts, |i| {
            let result = SaRunner::run_with_cancel(
                &problem,
                &config.sa_config(branch_seed(base_seed, i)),
                config.cancel.clone(),
            );
            debug!(
                event = "routing_restart",
                restart = i,
                best_cost = result.best_cost,
                iterations = result.iterations,
                accepted = result.accepted_moves,
            );
            result
        });

        let winner = argmin(runs.iter().map(|r| r.best_cost)).ok_or_else(|| {
            LogisticsError::InfeasibleRouting("no annealing run produced a plan".into())
        })?;
        let cancelled = runs.iter().any(|r| r.cancelled);
        let best = runs.swap_remove(winner);

        let (plan, cost) = evaluate_routes(instance, &best.best, config.crossing_penalty)
            .ok_or_else(|| {
                LogisticsError::InfeasibleRouting("best routes rejected by the oracle".into())
            })?;

        info!(
            event = "routing_end",
            vehicles = plan.num_vehicles(),
            best_cost = cost.total,
            iterations = best.iterations,
            cancelled = cancelled,
        );

        Ok(RoutingOutcome {
            routes: best.best,
            plan,
            cost,
            history: best.cost_history,
            iterations: best.iterations,
            accepted_moves: best.accepted_moves,
            final_temperature: best.final_temperature,
            cancelled,
        })
    }

    /// Sweep construction, repaired by random feasible moves if needed.
    fn initial_routes(&self, instance: &RoutingInstance, seed: u64) -> Result<DepotRoutes> {
        let routes = sweep(instance);
        let problem = RoutingProblem::new(instance, Vec::new(), 0.0, 0);
        if problem.is_feasible(&routes) {
            return Ok(routes);
        }

        debug!(event = "routing_repair", attempts = self.config.repair_attempts);
        let mut rng = create_rng(seed);
        problem
            .feasible_neighbor(&routes, self.config.repair_attempts, &mut rng)
            .ok_or_else(|| {
                LogisticsError::InfeasibleRouting(format!(
                    "no plan fits {} vehicles of capacity {} after {} repair attempts",
                    instance.fleet().count(),
                    instance.capacity(),
                    self.config.repair_attempts
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fleet, Point, Pricing};

    fn square(fleet: usize) -> RoutingInstance {
        RoutingInstance::new(
            vec![Point::new(0.0, 0.0)],
            vec![
                (Point::new(1.0, 1.0), 3.0),
                (Point::new(-1.0, 1.0), 3.0),
                (Point::new(-1.0, -1.0), 3.0),
                (Point::new(1.0, -1.0), 3.0),
            ],
            Fleet::new(6.0, fleet),
            Pricing::default(),
        )
        .expect("valid instance")
    }

    fn fast() -> RoutingConfig {
        RoutingConfig::default()
            .with_max_iterations(2_000)
            .with_seed(42)
    }

    #[test]
    fn test_two_vehicles_required() {
        let outcome = RoutingSolver::new(fast()).solve(&square(2)).expect("feasible");
        assert_eq!(outcome.plan.num_vehicles(), 2);
        for load in outcome.plan.loads(square(2).demands()) {
            assert!(load <= 6.0);
        }
        assert!(outcome.total_cost().is_finite());
        assert_eq!(outcome.cost.dispatch_cost, 1000.0);
    }

    #[test]
    fn test_fleet_of_one_is_infeasible() {
        let err = RoutingSolver::new(fast()).solve(&square(1)).unwrap_err();
        assert!(matches!(err, LogisticsError::InfeasibleRouting(_)));
    }

    #[test]
    fn test_history_non_increasing() {
        let outcome = RoutingSolver::new(fast()).solve(&square(3)).expect("feasible");
        assert!(!outcome.history.is_empty());
        for w in outcome.history.windows(2) {
            assert!(w[1] <= w[0] + 1e-9);
        }
        assert!((outcome.history.last().copied().unwrap_or(f64::NAN) - outcome.total_cost()).abs() < 1e-9);
    }

    #[test]
    fn test_repair_reorders_infeasible_sweep() {
        // Angle order gives demands 3, 4, 3, 2, which splits into three
        // vehicles; reordering fits two.
        let inst = RoutingInstance::new(
            vec![Point::new(0.0, 0.0)],
            vec![
                (Point::new(0.0, -1.0), 3.0),
                (Point::new(1.0, 0.0), 4.0),
                (Point::new(0.0, 1.0), 3.0),
                (Point::new(-1.0, 0.0), 2.0),
            ],
            Fleet::new(6.0, 2),
            Pricing::default(),
        )
        .expect("valid instance");
        let problem = RoutingProblem::new(&inst, Vec::new(), 0.0, 0);
        assert!(!problem.is_feasible(&sweep(&inst)));

        let outcome = RoutingSolver::new(fast()).solve(&inst).expect("repairable");
        assert_eq!(outcome.plan.num_vehicles(), 2);
        assert_eq!(outcome.plan.num_served(), 4);
    }

    #[test]
    fn test_restarts_deterministic() {
        let config = fast().with_restarts(3);
        let a = RoutingSolver::new(config.clone()).solve(&square(3)).expect("feasible");
        let b = RoutingSolver::new(config).solve(&square(3)).expect("feasible");
        assert_eq!(a.routes, b.routes);
        assert_eq!(a.total_cost(), b.total_cost());
    }

    #[test]
    fn test_cancelled_returns_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let outcome = RoutingSolver::new(fast().with_cancel(flag))
            .solve(&square(2))
            .expect("feasible start");
        assert!(outcome.cancelled);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_invalid_config() {
        let err = RoutingSolver::new(RoutingConfig::default().with_cooling_rate(1.0))
            .solve(&square(2))
            .unwrap_err();
        assert!(matches!(err, LogisticsError::InvalidParameter(_)));
    }

    #[test]
    fn test_infinite_temperature_rejected() {
        let config = RoutingConfig::default()
            .with_initial_temperature(f64::INFINITY)
            .with_max_iterations(0);
        assert!(matches!(
            config.validate(),
            Err(LogisticsError::InvalidParameter(_))
        ));
        assert!(RoutingConfig::default()
            .with_min_temperature(f64::INFINITY)
            .validate()
            .is_err());
        assert!(RoutingConfig::default()
            .with_initial_temperature(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_routes_from_activated_hubs() {
        use crate::models::{Node, NodeRole};
        use crate::network::Network;
        use crate::optimizers::{HubActivationConfig, HubActivationOptimizer};

        let network = Network::from_nodes(vec![
            Node::new("M1", "M1", NodeRole::Source, 5.0, 0.0),
            Node::new("H1", "H1", NodeRole::Relay, 0.0, 0.0),
            Node::new("H2", "H2", NodeRole::Relay, 10.0, 0.0),
            Node::new("D1", "D1", NodeRole::Sink, 0.0, 1.0).with_capacity(4.0),
            Node::new("D2", "D2", NodeRole::Sink, 1.0, 2.0).with_capacity(4.0),
            Node::new("D3", "D3", NodeRole::Sink, 10.0, 1.0).with_capacity(4.0),
            Node::new("D4", "D4", NodeRole::Sink, 9.0, 2.0).with_capacity(4.0),
        ])
        .expect("valid nodes");
        let hubs = HubActivationOptimizer::new(HubActivationConfig::default().with_seed(2))
            .optimize_hubs(&network)
            .expect("feasible");
        assert_eq!(hubs.best.hub_count, 2);

        let inst = RoutingInstance::from_hub_activation(
            &network,
            &hubs.best,
            Fleet::new(8.0, 2),
            Pricing::default(),
        )
        .expect("valid instance");
        let outcome = RoutingSolver::new(fast()).solve(&inst).expect("feasible");
        assert_eq!(outcome.plan.num_vehicles(), 2);
        assert_eq!(outcome.plan.num_served(), 4);
        for load in outcome.plan.loads(inst.demands()) {
            assert!(load <= 8.0);
        }
    }
}
