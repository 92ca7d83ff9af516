//! Dense L1 distance matrix over routing locations.

use crate::models::Point;

/// Row-major n×n matrix of L1 distances, computed once up front.
///
/// The routing annealer prices thousands of candidate plans over the same
/// locations, so every distance is read from here rather than recomputed.
///
/// # Examples
///
/// ```
/// use u_logistics::distance::DistanceMatrix;
/// use u_logistics::models::Point;
///
/// let points = vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(6.0, 8.0)];
/// let dm = DistanceMatrix::from_points(&points);
/// assert_eq!(dm.get(0, 1), 7.0);
/// assert_eq!(dm.get(2, 0), 14.0);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// L1 distances between every pair of `points`.
    pub fn from_points(points: &[Point]) -> Self {
        let data = points
            .iter()
            .flat_map(|a| points.iter().map(move |b| a.manhattan_distance(b)))
            .collect();
        Self {
            data,
            size: points.len(),
        }
    }

    /// Distance between locations `from` and `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of locations.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Nearest of `candidates` to `from`; the first candidate wins ties.
    ///
    /// Returns `None` if `candidates` is empty.
    pub fn nearest(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }
}
