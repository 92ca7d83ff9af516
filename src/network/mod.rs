//! Network model: located nodes, lazy L1 distances, clustering, and
//! delivery paths.
//!
//! - [`Network`] owns the nodes, their role lists, and the current assignment
//! - [`DistanceCache`] is the symmetric fill-on-miss distance store
//! - [`cluster_points`] is the k-means clusterer used to seed assignments

mod cache;
mod delivery;
mod kmeans;
mod model;

pub use cache::DistanceCache;
pub use kmeans::{cluster_points, Clustering, KMeansConfig};
pub use model::Network;
