//! Domain model types for two-tier network design and routing.
//!
//! Provides located nodes with roles, assignment solutions in both the 1:1
//! and 1:many shapes, hub-activation results with cost breakdowns, the
//! homogeneous fleet and pricing used by routing, and vehicle plans.

mod activation;
mod assignment;
mod fleet;
mod node;
mod plan;

pub use activation::{CostBreakdown, HubActivation};
pub use assignment::{AssignmentSolution, DeliveryPath, RelayLink};
pub use fleet::{Fleet, Pricing};
pub use node::{Node, NodeRecord, NodeRole, Point};
pub use plan::{SubRoute, VehiclePlan};
