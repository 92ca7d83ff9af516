//! Distance matrices.
//!
//! Provides a dense L1 distance matrix for the routing instance.

mod matrix;

pub use matrix::DistanceMatrix;
