//! Routing feasibility and cost evaluation.
//!
//! - [`split_route`] and [`build_vehicle_plan`] turn ordered depot routes
//!   into capacity-feasible vehicle plans under the fleet bound
//! - [`plan_cost`] prices a plan with load-weighted distances, dispatch
//!   costs, and a flat penalty for crossing depot legs

mod cost;
mod geometry;
mod oracle;

pub use cost::{evaluate_routes, has_crossing_legs, plan_cost, route_cost, RoutingCost};
pub use geometry::{segments_intersect, Segment};
pub use oracle::{build_vehicle_plan, split_route, DepotRoutes};
