//! Capacitated multi-depot routing.
//!
//! - [`RoutingInstance`]: depots and demand points with fleet and pricing
//! - [`RouteMove`]: the four neighbourhood moves over per-depot routes
//! - [`RoutingProblem`]: [`SaProblem`](u_metaheur::sa::SaProblem) implementation
//!   with oracle-checked neighbours
//! - [`RoutingSolver`]: sweep start, repair, and annealing with restarts

mod instance;
mod moves;
mod problem;
mod solver;

pub use instance::RoutingInstance;
pub use moves::RouteMove;
pub use problem::RoutingProblem;
pub use solver::{RoutingConfig, RoutingOutcome, RoutingSolver};
