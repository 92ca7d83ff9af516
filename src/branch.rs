//! Independent search branches and their deterministic reduction.
//!
//! Branches run on the rayon pool with the `parallel` feature and
//! sequentially otherwise. Results always come back in branch order, so the
//! reduction picks the same winner either way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Evaluates `f(0..count)` and returns the results in branch order.
pub(crate) fn run_branches<T, F>(count: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..count).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..count).map(f).collect()
    }
}

/// Seed of branch `index` derived from a base seed (splitmix64 finalizer).
pub(crate) fn branch_seed(base: u64, index: usize) -> u64 {
    let mut z = base.wrapping_add((index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Index of the lowest cost; the first one wins ties and NaN never wins.
pub(crate) fn argmin<I>(costs: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, cost) in costs.into_iter().enumerate() {
        if cost.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| cost < b) {
            best = Some((i, cost));
        }
    }
    best.map(|(i, _)| i)
}

/// Returns `true` if the flag is present and raised.
pub(crate) fn is_cancelled(flag: &Option<Arc<AtomicBool>>) -> bool {
    flag.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Seed from configuration, or one drawn from the thread RNG.
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}
