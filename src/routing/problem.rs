//! Annealing problem over per-depot routes.

use rand::Rng;
use u_metaheur::sa::SaProblem;

use super::instance::RoutingInstance;
use super::moves::RouteMove;
use crate::evaluation::{build_vehicle_plan, evaluate_routes, DepotRoutes};

/// Multi-depot routing as an [`SaProblem`].
///
/// A solution is one ordered route per depot; the feasibility oracle splits
/// it into vehicles. Infeasible solutions cost `f64::INFINITY`, so they are
/// never preferred to a feasible one.
pub struct RoutingProblem<'a> {
    instance: &'a RoutingInstance,
    initial: DepotRoutes,
    crossing_penalty: f64,
    neighbor_attempts: usize,
}

impl<'a> RoutingProblem<'a> {
    /// Creates the problem, starting every run from `initial`.
    pub fn new(
        instance: &'a RoutingInstance,
        initial: DepotRoutes,
        crossing_penalty: f64,
        neighbor_attempts: usize,
    ) -> Self {
        Self {
            instance,
            initial,
            crossing_penalty,
            neighbor_attempts,
        }
    }

    /// Returns `true` if the oracle accepts `routes`.
    pub fn is_feasible(&self, routes: &DepotRoutes) -> bool {
        build_vehicle_plan(self.instance, routes).is_some()
    }

    /// Draws up to `attempts` random moves from `routes` and returns the
    /// first feasible result.
    pub fn feasible_neighbor<R: Rng>(
        &self,
        routes: &DepotRoutes,
        attempts: usize,
        rng: &mut R,
    ) -> Option<DepotRoutes> {
        for _ in 0..attempts {
            let mut candidate = routes.clone();
            if !RouteMove::random(rng).apply(&mut candidate, rng) {
                continue;
            }
            if self.is_feasible(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

impl SaProblem for RoutingProblem<'_> {
    type Solution = DepotRoutes;

    fn initial_solution<R: Rng>(&self, _rng: &mut R) -> DepotRoutes {
        self.initial.clone()
    }

    fn cost(&self, routes: &DepotRoutes) -> f64 {
        evaluate_routes(self.instance, routes, self.crossing_penalty)
            .map_or(f64::INFINITY, |(_, cost)| cost.total)
    }

    fn neighbor<R: Rng>(&self, routes: &DepotRoutes, rng: &mut R) -> DepotRoutes {
        self.feasible_neighbor(routes, self.neighbor_attempts, rng)
            .unwrap_or_else(|| routes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fleet, Point, Pricing};
    use u_numflow::random::create_rng;

    fn instance(fleet: usize) -> RoutingInstance {
        RoutingInstance::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            vec![
                (Point::new(1.0, 1.0), 3.0),
                (Point::new(2.0, -1.0), 3.0),
                (Point::new(9.0, 1.0), 3.0),
                (Point::new(11.0, -1.0), 3.0),
            ],
            Fleet::new(6.0, fleet),
            Pricing::default(),
        )
        .expect("valid instance")
    }

    #[test]
    fn test_infeasible_costs_infinity() {
        let inst = instance(1);
        let problem = RoutingProblem::new(&inst, vec![vec![2, 3], vec![4, 5]], 20_000.0, 10);
        assert_eq!(problem.cost(&vec![vec![2, 3], vec![4, 5]]), f64::INFINITY);
        assert!(!problem.is_feasible(&vec![vec![2, 3], vec![4, 5]]));
    }

    #[test]
    fn test_neighbors_stay_feasible() {
        let inst = instance(2);
        let start = vec![vec![2, 3], vec![4, 5]];
        let problem = RoutingProblem::new(&inst, start.clone(), 20_000.0, 50);
        assert!(problem.cost(&start).is_finite());

        let mut rng = create_rng(7);
        let mut current = start;
        for _ in 0..200 {
            current = problem.neighbor(&current, &mut rng);
            assert!(problem.is_feasible(&current));
            assert_eq!(current.concat().len(), 4);
        }
    }

    #[test]
    fn test_feasible_neighbor_gives_up() {
        let inst = instance(2);
        let problem = RoutingProblem::new(&inst, vec![], 0.0, 0);
        let mut rng = create_rng(1);
        assert!(problem
            .feasible_neighbor(&vec![vec![2, 3], vec![4, 5]], 0, &mut rng)
            .is_none());
    }
}
