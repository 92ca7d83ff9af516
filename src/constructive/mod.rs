//! Constructive heuristics for the initial routing solution.
//!
//! - [`sweep`]: nearest-depot assignment with polar-angle ordering
//!   (Gillett & Miller, 1974), O(n·d + n log n)

mod sweep;

pub use sweep::sweep;
