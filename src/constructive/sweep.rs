//! Multi-depot sweep construction.
//!
//! # Algorithm
//!
//! Assigns every demand point to its L1-nearest depot, then orders each
//! depot's points by polar angle around the depot. Nearby points tend to
//! have similar angles, so consecutive points in the resulting route are
//! geographically close and split into compact sub-routes.
//!
//! # Complexity
//!
//! O(n·d + n log n) for n demand points and d depots.
//!
//! # Reference
//!
//! Gillett, B.E. & Miller, L.R. (1974). "A Heuristic Algorithm for the
//! Vehicle-Dispatch Problem", *Operations Research* 22(2), 340-349.

use crate::evaluation::DepotRoutes;
use crate::routing::RoutingInstance;

/// Builds one angle-ordered route per depot.
///
/// Ties in distance go to the lower depot index; ties in angle keep the
/// demand-point order. Feasibility is not checked here.
///
/// # Examples
///
/// ```
/// use u_logistics::constructive::sweep;
/// use u_logistics::models::{Fleet, Point, Pricing};
/// use u_logistics::routing::RoutingInstance;
///
/// let instance = RoutingInstance::new(
///     vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0)],
///     vec![
///         (Point::new(1.0, 1.0), 1.0),
///         (Point::new(19.0, 1.0), 1.0),
///         (Point::new(1.0, -1.0), 1.0),
///     ],
///     Fleet::new(10.0, 2),
///     Pricing::default(),
/// )
/// .unwrap();
///
/// let routes = sweep(&instance);
/// assert_eq!(routes, vec![vec![4, 2], vec![3]]);
/// ```
pub fn sweep(instance: &RoutingInstance) -> DepotRoutes {
    let depots: Vec<usize> = instance.depots().collect();
    let mut routes: DepotRoutes = vec![Vec::new(); depots.len()];

    for node in instance.demand_nodes() {
        if let Some(depot) = instance.distances().nearest(node, &depots) {
            routes[depot].push(node);
        }
    }

    for (depot, route) in routes.iter_mut().enumerate() {
        let origin = instance.point(depot);
        route.sort_by(|&a, &b| {
            instance
                .point(a)
                .angle_from(&origin)
                .total_cmp(&instance.point(b).angle_from(&origin))
        });
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fleet, Point, Pricing};

    fn single_depot(points: &[(f64, f64)]) -> RoutingInstance {
        RoutingInstance::new(
            vec![Point::new(0.0, 0.0)],
            points.iter().map(|&(x, y)| (Point::new(x, y), 1.0)).collect(),
            Fleet::new(100.0, 4),
            Pricing::default(),
        )
        .expect("valid instance")
    }

    #[test]
    fn test_sweep_angular_ordering() {
        // 0°, 90°, 180°, -90°
        let inst = single_depot(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)]);
        let routes = sweep(&inst);
        assert_eq!(routes, vec![vec![4, 1, 2, 3]]);
    }

    #[test]
    fn test_sweep_nearest_depot() {
        let inst = RoutingInstance::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            vec![
                (Point::new(9.0, 9.0), 1.0),
                (Point::new(1.0, 0.0), 1.0),
                (Point::new(5.0, 5.0), 1.0), // equidistant
            ],
            Fleet::new(10.0, 2),
            Pricing::default(),
        )
        .expect("valid instance");
        let routes = sweep(&inst);
        assert_eq!(routes[1], vec![2]);
        assert_eq!(routes[0].len(), 2);
        assert!(routes[0].contains(&4));
    }

    #[test]
    fn test_sweep_no_demand_points() {
        let inst = single_depot(&[]);
        assert_eq!(sweep(&inst), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_sweep_covers_every_node_once() {
        let inst = single_depot(&[(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0), (2.0, 0.5)]);
        let mut all: Vec<usize> = sweep(&inst).concat();
        all.sort();
        assert_eq!(all, (1..6).collect::<Vec<_>>());
    }
}
