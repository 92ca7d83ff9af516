//! Routing instance: depots and demand points with fleet and pricing.

use std::ops::Range;

use crate::distance::DistanceMatrix;
use crate::error::{LogisticsError, Result};
use crate::models::{Fleet, HubActivation, Point, Pricing};
use crate::network::Network;

/// A capacitated multi-depot routing instance.
///
/// Locations are ordered depots first, then demand points. Depots carry zero
/// demand. L1 distances between all locations are precomputed.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Fleet, Point, Pricing};
/// use u_logistics::routing::RoutingInstance;
///
/// let instance = RoutingInstance::new(
///     vec![Point::new(0.0, 0.0)],
///     vec![(Point::new(1.0, 0.0), 3.0), (Point::new(0.0, 2.0), 4.0)],
///     Fleet::new(10.0, 1),
///     Pricing::default(),
/// )
/// .unwrap();
///
/// assert_eq!(instance.num_depots(), 1);
/// assert_eq!(instance.demand_nodes(), 1..3);
/// assert_eq!(instance.distance(1, 2), 3.0);
/// assert_eq!(instance.total_demand(), 7.0);
/// ```
#[derive(Debug, Clone)]
pub struct RoutingInstance {
    points: Vec<Point>,
    demands: Vec<f64>,
    labels: Vec<String>,
    num_depots: usize,
    fleet: Fleet,
    pricing: Pricing,
    distances: DistanceMatrix,
}

impl RoutingInstance {
    /// Creates an instance; depots are labelled `D0..`, demand points `N0..`.
    ///
    /// # Errors
    ///
    /// [`LogisticsError::InvalidParameter`] if there is no depot, a
    /// coordinate or demand is invalid, or the fleet or pricing is rejected.
    pub fn new(
        depots: Vec<Point>,
        demand_points: Vec<(Point, f64)>,
        fleet: Fleet,
        pricing: Pricing,
    ) -> Result<Self> {
        let labels = (0..depots.len())
            .map(|i| format!("D{i}"))
            .chain((0..demand_points.len()).map(|j| format!("N{j}")))
            .collect();
        Self::with_labels(depots, demand_points, labels, fleet, pricing)
    }

    /// Creates an instance with explicit location labels (depots first).
    pub fn with_labels(
        depots: Vec<Point>,
        demand_points: Vec<(Point, f64)>,
        labels: Vec<String>,
        fleet: Fleet,
        pricing: Pricing,
    ) -> Result<Self> {
        fleet.validate()?;
        pricing.validate()?;
        if depots.is_empty() {
            return Err(LogisticsError::InvalidParameter(
                "routing needs at least one depot".into(),
            ));
        }
        let num_depots = depots.len();
        let mut points = depots;
        let mut demands = vec![0.0; num_depots];
        for (point, demand) in demand_points {
            if !demand.is_finite() || demand < 0.0 {
                return Err(LogisticsError::InvalidParameter(format!(
                    "demand must be non-negative, got {demand}"
                )));
            }
            points.push(point);
            demands.push(demand);
        }
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(LogisticsError::InvalidParameter(format!(
                "non-finite location ({}, {})",
                p.x, p.y
            )));
        }
        if labels.len() != points.len() {
            return Err(LogisticsError::InvalidParameter(format!(
                "expected {} labels, got {}",
                points.len(),
                labels.len()
            )));
        }
        let distances = DistanceMatrix::from_points(&points);
        Ok(Self {
            points,
            demands,
            labels,
            num_depots,
            fleet,
            pricing,
            distances,
        })
    }

    /// Builds an instance from an activated hub set.
    ///
    /// Active hubs become the depots, in activation order; every sink of the
    /// network becomes a demand point whose demand is the sink's capacity
    /// (zero when absent).
    ///
    /// # Errors
    ///
    /// [`LogisticsError::MissingNode`] if a hub is not in `network`.
    pub fn from_hub_activation(
        network: &Network,
        activation: &HubActivation,
        fleet: Fleet,
        pricing: Pricing,
    ) -> Result<Self> {
        let mut depots = Vec::with_capacity(activation.active_hubs.len());
        let mut labels = Vec::new();
        for hub in &activation.active_hubs {
            depots.push(network.node(hub)?.location());
            labels.push(hub.clone());
        }
        let demand_points = network
            .sinks()
            .iter()
            .map(|&i| {
                let sink = network.node_at(i);
                labels.push(sink.id().to_string());
                (sink.location(), sink.capacity().unwrap_or(0.0))
            })
            .collect();
        Self::with_labels(depots, demand_points, labels, fleet, pricing)
    }

    /// Number of depots.
    pub fn num_depots(&self) -> usize {
        self.num_depots
    }

    /// Depot indices.
    pub fn depots(&self) -> Range<usize> {
        0..self.num_depots
    }

    /// Demand point indices.
    pub fn demand_nodes(&self) -> Range<usize> {
        self.num_depots..self.points.len()
    }

    /// Total number of locations.
    pub fn num_locations(&self) -> usize {
        self.points.len()
    }

    /// All locations, depots first.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Location of index `i`.
    pub fn point(&self, i: usize) -> Point {
        self.points[i]
    }

    /// Demand per location (zero for depots).
    pub fn demands(&self) -> &[f64] {
        &self.demands
    }

    /// Demand of location `i`.
    pub fn demand(&self, i: usize) -> f64 {
        self.demands[i]
    }

    /// Sum of all demands.
    pub fn total_demand(&self) -> f64 {
        self.demands.iter().sum()
    }

    /// Label of location `i`.
    pub fn label(&self, i: usize) -> &str {
        &self.labels[i]
    }

    /// Location labels, depots first.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> f64 {
        self.fleet.capacity()
    }

    /// The fleet.
    pub fn fleet(&self) -> Fleet {
        self.fleet
    }

    /// The pricing.
    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    /// L1 distance between two locations.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// The precomputed distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }
}
