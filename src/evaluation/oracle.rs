//! Feasibility oracle: splits depot routes into capacity-feasible sub-routes
//! under a shared fleet bound.

use crate::models::{SubRoute, VehiclePlan};
use crate::routing::RoutingInstance;

/// Ordered demand nodes per depot, indexed by depot.
pub type DepotRoutes = Vec<Vec<usize>>;

/// Splits one depot's ordered route into vehicle sub-routes.
///
/// Nodes are packed in order until the next one would exceed the vehicle
/// capacity, which opens a new sub-route. Once `max_vehicles` sub-routes
/// exist, an overflowing node is inserted into the first sub-route with
/// enough spare capacity instead.
///
/// Returns `None` if a single node exceeds the capacity, if an overflowing
/// node fits nowhere, or if the split needs more than `max_vehicles`
/// sub-routes.
///
/// # Examples
///
/// ```
/// use u_logistics::evaluation::split_route;
/// use u_logistics::models::{Fleet, Point, Pricing};
/// use u_logistics::routing::RoutingInstance;
///
/// let nodes = (1..=4).map(|i| (Point::new(i as f64, 0.0), 3.0)).collect();
/// let instance = RoutingInstance::new(
///     vec![Point::new(0.0, 0.0)],
///     nodes,
///     Fleet::new(6.0, 2),
///     Pricing::default(),
/// )
/// .unwrap();
///
/// let split = split_route(&instance, &[1, 2, 3, 4], 0, 2).unwrap();
/// assert_eq!(split.len(), 2);
/// assert!(split_route(&instance, &[1, 2, 3, 4], 0, 1).is_none());
/// ```
pub fn split_route(
    instance: &RoutingInstance,
    route: &[usize],
    depot: usize,
    max_vehicles: usize,
) -> Option<Vec<SubRoute>> {
    let capacity = instance.capacity();
    let mut sub_routes: Vec<SubRoute> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut load = 0.0;

    for &node in route {
        let demand = instance.demand(node);
        if demand > capacity {
            return None;
        }
        if load + demand <= capacity {
            current.push(node);
            load += demand;
            continue;
        }

        if !current.is_empty() {
            sub_routes.push(SubRoute::new(depot, std::mem::take(&mut current)));
        }

        if sub_routes.len() >= max_vehicles {
            let slot = sub_routes
                .iter_mut()
                .find(|r| r.load(instance.demands()) + demand <= capacity)?;
            slot.nodes.push(node);
            load = 0.0;
        } else {
            current.push(node);
            load = demand;
        }
    }

    if !current.is_empty() {
        sub_routes.push(SubRoute::new(depot, current));
    }
    if sub_routes.len() > max_vehicles {
        return None;
    }
    Some(sub_routes)
}

/// Splits every depot's route, handing each depot the fleet budget left by
/// the depots before it.
///
/// Returns `None` if any depot cannot be split within its budget.
pub fn build_vehicle_plan(instance: &RoutingInstance, routes: &[Vec<usize>]) -> Option<VehiclePlan> {
    let fleet = instance.fleet().count();
    let mut used = 0;
    let mut plan = VehiclePlan::new();

    for (depot, route) in routes.iter().enumerate() {
        let sub_routes = split_route(instance, route, depot, fleet - used)?;
        used += sub_routes.len();
        plan.insert(depot, sub_routes);
    }
    Some(plan)
}
