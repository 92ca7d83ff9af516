//! Vehicle execution plans produced by the routing oracle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::RoutingInstance;

/// One vehicle's visitation sequence, leaving from and returning to `depot`.
///
/// Node indices refer to the routing instance's location list; the depot is
/// not repeated inside `nodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRoute {
    /// Depot index.
    pub depot: usize,
    /// Demand node indices in visit order.
    pub nodes: Vec<usize>,
}

impl SubRoute {
    /// Creates a sub-route.
    pub fn new(depot: usize, nodes: Vec<usize>) -> Self {
        Self { depot, nodes }
    }

    /// Sum of the demands of the visited nodes.
    pub fn load(&self, demands: &[f64]) -> f64 {
        self.nodes.iter().map(|&n| demands[n]).sum()
    }

    /// Number of visited nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the vehicle visits nothing.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Sub-routes grouped by depot.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{SubRoute, VehiclePlan};
///
/// let mut plan = VehiclePlan::new();
/// plan.insert(0, vec![SubRoute::new(0, vec![2, 3]), SubRoute::new(0, vec![4])]);
/// plan.insert(1, vec![SubRoute::new(1, vec![5])]);
/// assert_eq!(plan.num_vehicles(), 3);
/// assert_eq!(plan.num_served(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePlan {
    depots: BTreeMap<usize, Vec<SubRoute>>,
}

impl VehiclePlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sub-routes of a depot.
    pub fn insert(&mut self, depot: usize, routes: Vec<SubRoute>) {
        self.depots.insert(depot, routes);
    }

    /// Sub-routes of one depot.
    pub fn routes_of(&self, depot: usize) -> &[SubRoute] {
        self.depots.get(&depot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depot → sub-routes.
    pub fn depots(&self) -> &BTreeMap<usize, Vec<SubRoute>> {
        &self.depots
    }

    /// All sub-routes in depot order.
    pub fn sub_routes(&self) -> impl Iterator<Item = &SubRoute> {
        self.depots.values().flatten()
    }

    /// Total number of vehicles dispatched.
    pub fn num_vehicles(&self) -> usize {
        self.depots.values().map(Vec::len).sum()
    }

    /// Total number of demand nodes served.
    pub fn num_served(&self) -> usize {
        self.sub_routes().map(SubRoute::len).sum()
    }

    /// Load of each sub-route, in depot order.
    pub fn loads(&self, demands: &[f64]) -> Vec<f64> {
        self.sub_routes().map(|r| r.load(demands)).collect()
    }

    /// Load of each sub-route as a percentage of the instance's vehicle
    /// capacity, in depot order.
    pub fn utilization(&self, instance: &RoutingInstance) -> Vec<f64> {
        let capacity = instance.capacity();
        self.loads(instance.demands())
            .into_iter()
            .map(|load| load / capacity * 100.0)
            .collect()
    }
}
