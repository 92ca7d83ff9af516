//! Lazily filled symmetric distance cache.

use std::sync::OnceLock;

use crate::models::Point;

/// Symmetric L1 distance cache, filled on demand.
///
/// Only the strict lower triangle is stored: the pair `{i, j}` with `i < j`
/// lives in row `j`, column `i`. A row is allocated the first time one of
/// its pairs is queried, so memory follows the queried pairs rather than
/// the node count. Warming every pair of `n` nodes still takes
/// `n(n-1)/2` cells.
///
/// Each cell is a [`OnceLock`], so concurrent readers may fill missing
/// entries without a global lock. A cell, once written, never changes for
/// the lifetime of the cache, including across [`grow`](Self::grow).
///
/// # Examples
///
/// ```
/// use u_logistics::models::Point;
/// use u_logistics::network::DistanceCache;
///
/// let points = [Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
/// let cache = DistanceCache::new(points.len());
/// assert_eq!(cache.filled(), 0);
/// assert_eq!(cache.get_or_compute(0, 1, &points), 7.0);
/// assert_eq!(cache.filled(), 2); // (0,1) and (1,0)
/// assert_eq!(cache.get_or_compute(1, 1, &points), 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DistanceCache {
    rows: Vec<OnceLock<Box<[OnceLock<f64>]>>>,
}

impl DistanceCache {
    /// Creates an empty cache for `size` locations.
    pub fn new(size: usize) -> Self {
        let mut cache = Self::default();
        cache.grow(size);
        cache
    }

    /// Extends the cache to cover `size` locations, keeping every filled
    /// cell. Does nothing if `size` is not larger than the current size.
    pub fn grow(&mut self, size: usize) {
        if size > self.rows.len() {
            self.rows.resize_with(size, OnceLock::new);
        }
    }

    /// Number of locations covered.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Cached distance, if present.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        if from == to {
            assert!(from < self.size(), "index {from} out of bounds");
            return Some(0.0);
        }
        let (lo, hi) = ordered(from, to);
        self.rows[hi].get().and_then(|row| row[lo].get().copied())
    }

    /// Returns the cached distance or computes it from `points` and stores
    /// it for both directions.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get_or_compute(&self, from: usize, to: usize, points: &[Point]) -> f64 {
        if from == to {
            return 0.0;
        }
        let (lo, hi) = ordered(from, to);
        let row = self.rows[hi].get_or_init(|| (0..hi).map(|_| OnceLock::new()).collect());
        *row[lo].get_or_init(|| points[lo].manhattan_distance(&points[hi]))
    }

    /// Fills every off-diagonal cell.
    pub fn fill_all(&self, points: &[Point]) {
        for j in 1..self.size() {
            for i in 0..j {
                self.get_or_compute(i, j, points);
            }
        }
    }

    /// Number of filled off-diagonal ordered pairs; each stored pair counts
    /// for `(i, j)` and `(j, i)`.
    pub fn filled(&self) -> usize {
        let stored: usize = self
            .rows
            .iter()
            .filter_map(OnceLock::get)
            .map(|row| row.iter().filter(|c| c.get().is_some()).count())
            .sum();
        stored * 2
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
