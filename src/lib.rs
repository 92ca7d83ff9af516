//! # u-logistics
//!
//! Two-tier logistics network design and routing: choose which relay hubs
//! to activate, assign sources and sinks to them, then plan
//! capacity-constrained vehicle routes out of the active hubs.
//!
//! ## Modules
//!
//! - [`models`]: Domain types (Node, AssignmentSolution, HubActivation, Fleet, VehiclePlan)
//! - [`network`]: Node registry with lazy L1 distance cache, k-means, delivery paths
//! - [`optimizers`]: Exhaustive, greedy, clustered annealing, and hub activation
//! - [`distance`]: Dense L1 distance matrix for routing instances
//! - [`evaluation`]: Routing feasibility oracle and load-weighted cost model
//! - [`constructive`]: Nearest-depot sweep construction
//! - [`routing`]: Multi-depot routing by simulated annealing
//! - [`error`]: Error taxonomy
//!
//! ## Features
//!
//! - `parallel` (default): evaluate relay subsets and routing restarts on
//!   the rayon thread pool. Results do not depend on this feature.

mod branch;

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod network;
pub mod optimizers;
pub mod routing;

pub use error::{LogisticsError, Result};
