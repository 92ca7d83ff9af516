//! Load-weighted routing cost model.

use serde::{Deserialize, Serialize};

use super::geometry::{segments_intersect, Segment};
use super::oracle::build_vehicle_plan;
use crate::models::{SubRoute, VehiclePlan};
use crate::routing::RoutingInstance;

/// Cost of a vehicle plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingCost {
    /// Distance cost of each sub-route, in plan order.
    pub route_costs: Vec<f64>,
    /// Dispatch cost summed over all sub-routes.
    pub dispatch_cost: f64,
    /// Crossing penalty, zero when no boundary legs cross.
    pub crossing_penalty: f64,
    /// Sum of all components.
    pub total: f64,
}

impl RoutingCost {
    /// Sum of the sub-route distance costs.
    pub fn distance_cost(&self) -> f64 {
        self.route_costs.iter().sum()
    }
}

/// Distance cost of one sub-route.
///
/// Walks depot → nodes → depot. Each segment costs distance × unit price ×
/// the load accumulated so far, counting the node the segment arrives at;
/// the return leg is charged at the full load.
///
/// # Examples
///
/// ```
/// use u_logistics::evaluation::route_cost;
/// use u_logistics::models::{Fleet, Point, Pricing, SubRoute};
/// use u_logistics::routing::RoutingInstance;
///
/// let instance = RoutingInstance::new(
///     vec![Point::new(0.0, 0.0)],
///     vec![(Point::new(1.0, 0.0), 2.0), (Point::new(2.0, 0.0), 1.0)],
///     Fleet::new(10.0, 1),
///     Pricing::default().with_unit_price(1.0),
/// )
/// .unwrap();
///
/// // 1·2 + 1·3 + 2·3
/// assert_eq!(route_cost(&instance, &SubRoute::new(0, vec![1, 2])), 11.0);
/// ```
pub fn route_cost(instance: &RoutingInstance, route: &SubRoute) -> f64 {
    let price = instance.pricing().unit_price;
    let mut cost = 0.0;
    let mut load = 0.0;
    let mut prev = route.depot;
    for &node in &route.nodes {
        load += instance.demand(node);
        cost += instance.distance(prev, node) * price * load;
        prev = node;
    }
    cost + instance.distance(prev, route.depot) * price * load
}

/// Returns `true` if any two depot-adjacent legs of the plan cross.
///
/// Only the first and last leg of each sub-route are compared. Legs leaving
/// the same depot share its point and never count.
pub fn has_crossing_legs(instance: &RoutingInstance, plan: &VehiclePlan) -> bool {
    let legs: Vec<Segment> = plan
        .sub_routes()
        .filter_map(|r| {
            let first = *r.nodes.first()?;
            let last = *r.nodes.last()?;
            let depot = instance.point(r.depot);
            Some([
                Segment::new(depot, instance.point(first)),
                Segment::new(instance.point(last), depot),
            ])
        })
        .flatten()
        .collect();

    legs.iter()
        .enumerate()
        .any(|(i, a)| legs[i + 1..].iter().any(|b| segments_intersect(a, b)))
}

/// Prices a plan: sub-route distance costs, one dispatch cost per
/// sub-route, and `crossing_penalty` once if boundary legs cross.
pub fn plan_cost(instance: &RoutingInstance, plan: &VehiclePlan, crossing_penalty: f64) -> RoutingCost {
    let route_costs: Vec<f64> = plan.sub_routes().map(|r| route_cost(instance, r)).collect();
    let dispatch_cost = plan.num_vehicles() as f64 * instance.pricing().dispatch_cost;
    let crossing_penalty = if has_crossing_legs(instance, plan) {
        crossing_penalty
    } else {
        0.0
    };
    let total = route_costs.iter().sum::<f64>() + dispatch_cost + crossing_penalty;
    RoutingCost {
        route_costs,
        dispatch_cost,
        crossing_penalty,
        total,
    }
}

/// Runs the oracle and prices the resulting plan.
///
/// Returns `None` if the routes are infeasible.
pub fn evaluate_routes(
    instance: &RoutingInstance,
    routes: &[Vec<usize>],
    crossing_penalty: f64,
) -> Option<(VehiclePlan, RoutingCost)> {
    let plan = build_vehicle_plan(instance, routes)?;
    let cost = plan_cost(instance, &plan, crossing_penalty);
    Some((plan, cost))
}
