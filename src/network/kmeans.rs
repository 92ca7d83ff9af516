//! K-means clustering of planar points under the L1 metric.
//!
//! # Algorithm
//!
//! Seeds `k` centroids on distinct random points, then alternates between
//! assigning every point to its L1-nearest centroid and moving each centroid
//! to the mean of its members. A centroid left without members is re-seeded
//! on a random point. Stops when no membership changes or after
//! `max_iterations` rounds.
//!
//! # Reference
//!
//! Lloyd, S. (1982). "Least squares quantization in PCM", *IEEE Transactions
//! on Information Theory* 28(2), 129-137.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{LogisticsError, Result};
use crate::models::Point;

/// K-means settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Maximum assignment/update rounds.
    pub max_iterations: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
        }
    }
}

impl KMeansConfig {
    /// Sets the round limit.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }
}

/// Result of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Member indices (into the input points) of each cluster.
    pub clusters: Vec<Vec<usize>>,
    /// Final centroid of each cluster.
    pub centroids: Vec<Point>,
    /// Rounds performed.
    pub iterations: usize,
}

impl Clustering {
    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Returns `true` if there are no clusters.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Clusters `points` into `k` groups; `k` is clamped to `points.len()`.
///
/// # Errors
///
/// [`LogisticsError::InvalidParameter`] if `points` is empty or `k == 0`.
///
/// # Examples
///
/// ```
/// use u_logistics::models::Point;
/// use u_logistics::network::{cluster_points, KMeansConfig};
///
/// let points = vec![
///     Point::new(0.0, 0.0),
///     Point::new(0.5, 0.0),
///     Point::new(10.0, 10.0),
///     Point::new(10.5, 10.0),
/// ];
/// let mut rng = u_numflow::random::create_rng(7);
/// let result = cluster_points(&points, 5, &KMeansConfig::default(), &mut rng).unwrap();
/// assert_eq!(result.len(), 4); // clamped
/// ```
pub fn cluster_points<R: Rng>(
    points: &[Point],
    k: usize,
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<Clustering> {
    if points.is_empty() {
        return Err(LogisticsError::InvalidParameter(
            "no entities to cluster".into(),
        ));
    }
    if k == 0 {
        return Err(LogisticsError::InvalidParameter(
            "cluster count must be positive".into(),
        ));
    }

    let n = points.len();
    let k = k.min(n);

    let mut centroids: Vec<Point> = rand::seq::index::sample(rng, n, k)
        .iter()
        .map(|i| points[i])
        .collect();
    let mut labels: Vec<usize> = vec![usize::MAX; n];
    let mut iterations = 0;

    for _ in 0..config.max_iterations {
        let new_labels: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
        if new_labels == labels {
            break;
        }
        labels = new_labels;
        iterations += 1;

        let mut sums = vec![(0.0, 0.0, 0usize); k];
        for (p, &label) in points.iter().zip(&labels) {
            sums[label].0 += p.x;
            sums[label].1 += p.y;
            sums[label].2 += 1;
        }
        for (centroid, &(sx, sy, count)) in centroids.iter_mut().zip(&sums) {
            *centroid = if count == 0 {
                points[rng.random_range(0..n)]
            } else {
                Point::new(sx / count as f64, sy / count as f64)
            };
        }
    }

    // A zero-round budget still yields a labelling.
    if labels.iter().any(|&l| l == usize::MAX) {
        labels = points.iter().map(|p| nearest(p, &centroids)).collect();
    }

    let mut clusters = vec![Vec::new(); k];
    for (idx, &label) in labels.iter().enumerate() {
        clusters[label].push(idx);
    }

    Ok(Clustering {
        clusters,
        centroids,
        iterations,
    })
}

/// Index of the L1-nearest centroid; first wins on ties.
fn nearest(p: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = p.manhattan_distance(c);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::random::create_rng;

    fn two_blobs() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(20.0, 20.0),
            Point::new(21.0, 20.0),
            Point::new(20.0, 21.0),
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let points = two_blobs();
        // Any seeding on distinct points converges to the two blobs.
        for seed in 0..10 {
            let mut rng = create_rng(seed);
            let result = cluster_points(&points, 2, &KMeansConfig::default(), &mut rng)
                .expect("valid input");
            let mut sizes: Vec<usize> = result.clusters.iter().map(Vec::len).collect();
            sizes.sort();
            assert_eq!(sizes, vec![3, 3], "seed {seed}");
            for cluster in &result.clusters {
                let low = cluster.iter().all(|&i| i < 3);
                let high = cluster.iter().all(|&i| i >= 3);
                assert!(low || high);
            }
        }
    }

    #[test]
    fn test_every_point_labelled_once() {
        let points = two_blobs();
        let mut rng = create_rng(3);
        let result = cluster_points(&points, 3, &KMeansConfig::default(), &mut rng)
            .expect("valid input");
        let mut all: Vec<usize> = result.clusters.concat();
        all.sort();
        assert_eq!(all, (0..points.len()).collect::<Vec<_>>());
        assert_eq!(result.centroids.len(), 3);
    }

    #[test]
    fn test_single_cluster_centroid_is_mean() {
        let points = vec![Point::new(0.0, 0.0), Point::new(2.0, 4.0)];
        let mut rng = create_rng(1);
        let result = cluster_points(&points, 1, &KMeansConfig::default(), &mut rng)
            .expect("valid input");
        assert_eq!(result.clusters, vec![vec![0, 1]]);
        assert!((result.centroids[0].x - 1.0).abs() < 1e-10);
        assert!((result.centroids[0].y - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_k_clamped() {
        let points = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        let mut rng = create_rng(1);
        let result = cluster_points(&points, 10, &KMeansConfig::default(), &mut rng)
            .expect("valid input");
        assert_eq!(result.len(), 2);
        assert!(result.clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_zero_iterations_still_labels() {
        let points = two_blobs();
        let mut rng = create_rng(5);
        let config = KMeansConfig::default().with_max_iterations(0);
        let result = cluster_points(&points, 2, &config, &mut rng).expect("valid input");
        assert_eq!(result.iterations, 0);
        assert_eq!(result.clusters.concat().len(), points.len());
    }

    #[test]
    fn test_invalid_input() {
        let mut rng = create_rng(1);
        assert!(cluster_points(&[], 2, &KMeansConfig::default(), &mut rng).is_err());
        let points = two_blobs();
        assert!(cluster_points(&points, 0, &KMeansConfig::default(), &mut rng).is_err());
    }
}
