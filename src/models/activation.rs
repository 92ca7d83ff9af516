//! Hub-activation results of the k-means + annealing optimizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AssignmentSolution, RelayLink};

/// Cost of an activated hub set and its sink assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Sum of the activated relays' build costs.
    pub activation: f64,
    /// Unit price × L1 distance from every source to every active relay.
    pub source_transport: f64,
    /// Unit price × L1 distance from each sink's relay to the sink.
    pub sink_transport: f64,
}

impl CostBreakdown {
    /// Sum of all components.
    pub fn total(&self) -> f64 {
        self.activation + self.source_transport + self.sink_transport
    }
}

/// A set of activated relays with every sink assigned to one of them.
///
/// Every active relay serves at least one sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubActivation {
    /// Number of activated relays.
    pub hub_count: usize,
    /// Activated relay identifiers, in network order.
    pub active_hubs: Vec<String>,
    /// Sink → relay.
    pub sink_assignments: BTreeMap<String, String>,
    /// Source identifiers feeding every active hub.
    pub sources: Vec<String>,
    /// Price per distance unit used for both transport terms.
    pub unit_transport_cost: f64,
    /// Cost components.
    pub cost: CostBreakdown,
}

impl HubActivation {
    /// Total cost.
    pub fn total_cost(&self) -> f64 {
        self.cost.total()
    }

    /// Number of sinks served by `hub`.
    pub fn sinks_served_by(&self, hub: &str) -> usize {
        self.sink_assignments.values().filter(|h| *h == hub).count()
    }

    /// Expresses the result as an assignment: every source feeds every
    /// active hub, each sink is served by its one hub.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use u_logistics::models::{CostBreakdown, HubActivation};
    ///
    /// let activation = HubActivation {
    ///     hub_count: 2,
    ///     active_hubs: vec!["H1".into(), "H2".into()],
    ///     sink_assignments: BTreeMap::from([
    ///         ("D1".to_string(), "H1".to_string()),
    ///         ("D2".to_string(), "H2".to_string()),
    ///     ]),
    ///     sources: vec!["S1".into()],
    ///     unit_transport_cost: 1.0,
    ///     cost: CostBreakdown::default(),
    /// };
    /// let assignment = activation.to_assignment();
    /// assert_eq!(assignment.source_pairs().count(), 2);
    /// assert_eq!(assignment.sink_pairs().count(), 2);
    /// ```
    pub fn to_assignment(&self) -> AssignmentSolution {
        let mut assignment = AssignmentSolution::new();
        for source in &self.sources {
            assignment.link_source(source.clone(), RelayLink::Many(self.active_hubs.clone()));
        }
        for (sink, hub) in &self.sink_assignments {
            assignment.link_sink(sink.clone(), hub.clone());
        }
        assignment
    }
}
