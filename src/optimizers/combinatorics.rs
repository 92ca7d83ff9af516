//! Lexicographic enumeration of index combinations and permutations.

/// All `k`-subsets of `0..n`, in lexicographic order.
///
/// Yields nothing when `k > n`, and a single empty subset when `k == 0`.
///
/// # Examples
///
/// ```
/// use u_logistics::optimizers::Combinations;
///
/// let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
/// assert_eq!(all.len(), 6);
/// assert_eq!(all[0], vec![0, 1]);
/// assert_eq!(all[5], vec![2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        let current = (k <= n).then(|| (0..k).collect());
        Self { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.take()?;
        let k = out.len();
        let mut next = out.clone();
        // rightmost position that can still move right
        if let Some(i) = (0..k).rev().find(|&i| next[i] < self.n - k + i) {
            next[i] += 1;
            for j in i + 1..k {
                next[j] = next[j - 1] + 1;
            }
            self.current = Some(next);
        }
        Some(out)
    }
}

/// All orderings of `0..n`, in lexicographic order.
///
/// # Examples
///
/// ```
/// use u_logistics::optimizers::Permutations;
///
/// let all: Vec<Vec<usize>> = Permutations::new(3).collect();
/// assert_eq!(all.len(), 6);
/// assert_eq!(all[1], vec![0, 2, 1]);
/// assert_eq!(all[5], vec![2, 1, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct Permutations {
    current: Option<Vec<usize>>,
}

impl Permutations {
    pub fn new(n: usize) -> Self {
        Self {
            current: Some((0..n).collect()),
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.take()?;
        let mut next = out.clone();
        let n = next.len();
        if n >= 2 {
            if let Some(i) = (0..n - 1).rev().find(|&i| next[i] < next[i + 1]) {
                let j = (i + 1..n).rev().find(|&j| next[j] > next[i]).unwrap_or(i + 1);
                next.swap(i, j);
                next[i + 1..].reverse();
                self.current = Some(next);
            }
        }
        Some(out)
    }
}
