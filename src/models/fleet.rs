//! Homogeneous fleet and transport pricing.

use serde::{Deserialize, Serialize};

use crate::error::{LogisticsError, Result};

/// A homogeneous vehicle fleet shared by all depots.
///
/// # Examples
///
/// ```
/// use u_logistics::models::Fleet;
///
/// let fleet = Fleet::new(6.0, 2);
/// assert_eq!(fleet.capacity(), 6.0);
/// assert_eq!(fleet.count(), 2);
/// assert!(fleet.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    capacity: f64,
    count: usize,
}

impl Fleet {
    /// Creates a fleet of `count` vehicles of the given capacity.
    pub fn new(capacity: f64, count: usize) -> Self {
        Self { capacity, count }
    }

    /// Load capacity of each vehicle.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Number of vehicles available across all depots.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Rejects non-positive capacity.
    pub fn validate(&self) -> Result<()> {
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return Err(LogisticsError::InvalidParameter(format!(
                "vehicle capacity must be positive, got {}",
                self.capacity
            )));
        }
        Ok(())
    }
}

/// Prices applied by the routing cost model.
///
/// Defaults: 3.0 per distance·load unit, 500 per dispatched vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pricing {
    /// Price per unit of distance per unit of load carried.
    pub unit_price: f64,
    /// Fixed cost per dispatched vehicle (sub-route).
    pub dispatch_cost: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            unit_price: 3.0,
            dispatch_cost: 500.0,
        }
    }
}

impl Pricing {
    /// Sets the per-distance unit price.
    pub fn with_unit_price(mut self, price: f64) -> Self {
        self.unit_price = price;
        self
    }

    /// Sets the per-vehicle dispatch cost.
    pub fn with_dispatch_cost(mut self, cost: f64) -> Self {
        self.dispatch_cost = cost;
        self
    }

    /// Rejects negative or non-finite prices.
    pub fn validate(&self) -> Result<()> {
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(LogisticsError::InvalidParameter(format!(
                "unit price must be non-negative, got {}",
                self.unit_price
            )));
        }
        if !self.dispatch_cost.is_finite() || self.dispatch_cost < 0.0 {
            return Err(LogisticsError::InvalidParameter(format!(
                "dispatch cost must be non-negative, got {}",
                self.dispatch_cost
            )));
        }
        Ok(())
    }
}
