//! Neighbourhood moves over per-depot routes.
//!
//! # Moves
//!
//! - [`RouteMove::SwapBetween`]: exchange one node between two depots
//! - [`RouteMove::SwapWithin`]: exchange two nodes of one depot's route
//! - [`RouteMove::Relocate`]: move one node to any position of another depot's route
//! - [`RouteMove::Reverse`]: reverse a contiguous segment of one route (2-opt)
//!
//! Moves change only the visiting order and the depot of nodes; splitting
//! into vehicles is left to the feasibility oracle.

use rand::Rng;

use crate::evaluation::DepotRoutes;

/// One neighbourhood move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMove {
    SwapBetween,
    SwapWithin,
    Relocate,
    Reverse,
}

impl RouteMove {
    /// All moves, drawn uniformly by [`RouteMove::random`].
    pub const ALL: [RouteMove; 4] = [
        RouteMove::SwapBetween,
        RouteMove::SwapWithin,
        RouteMove::Relocate,
        RouteMove::Reverse,
    ];

    /// Picks a move uniformly at random.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Applies the move in place.
    ///
    /// Returns `false`, leaving `routes` untouched, when the move does not
    /// apply (too few depots or too short a route).
    ///
    /// # Examples
    ///
    /// ```
    /// use u_logistics::routing::RouteMove;
    ///
    /// let mut rng = u_numflow::random::create_rng(3);
    /// let mut routes = vec![vec![2, 3, 4, 5]];
    /// assert!(RouteMove::Reverse.apply(&mut routes, &mut rng));
    /// assert!(!RouteMove::Relocate.apply(&mut routes, &mut rng)); // one depot
    ///
    /// let mut sorted = routes[0].clone();
    /// sorted.sort();
    /// assert_eq!(sorted, vec![2, 3, 4, 5]);
    /// ```
    pub fn apply<R: Rng>(self, routes: &mut DepotRoutes, rng: &mut R) -> bool {
        match self {
            RouteMove::SwapBetween => swap_between(routes, rng),
            RouteMove::SwapWithin => swap_within(routes, rng),
            RouteMove::Relocate => relocate(routes, rng),
            RouteMove::Reverse => reverse(routes, rng),
        }
    }
}

fn two_distinct<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let pair = rand::seq::index::sample(rng, n, 2);
    (pair.index(0), pair.index(1))
}

fn swap_between<R: Rng>(routes: &mut DepotRoutes, rng: &mut R) -> bool {
    if routes.len() < 2 {
        return false;
    }
    let (a, b) = two_distinct(routes.len(), rng);
    if routes[a].is_empty() || routes[b].is_empty() {
        return false;
    }
    let i = rng.random_range(0..routes[a].len());
    let j = rng.random_range(0..routes[b].len());
    let node = routes[a][i];
    routes[a][i] = routes[b][j];
    routes[b][j] = node;
    true
}

fn swap_within<R: Rng>(routes: &mut DepotRoutes, rng: &mut R) -> bool {
    if routes.is_empty() {
        return false;
    }
    let d = rng.random_range(0..routes.len());
    if routes[d].len() < 2 {
        return false;
    }
    let (i, j) = two_distinct(routes[d].len(), rng);
    routes[d].swap(i, j);
    true
}

fn relocate<R: Rng>(routes: &mut DepotRoutes, rng: &mut R) -> bool {
    if routes.len() < 2 {
        return false;
    }
    let (from, to) = two_distinct(routes.len(), rng);
    if routes[from].is_empty() {
        return false;
    }
    let i = rng.random_range(0..routes[from].len());
    let node = routes[from].remove(i);
    let pos = rng.random_range(0..=routes[to].len());
    routes[to].insert(pos, node);
    true
}

fn reverse<R: Rng>(routes: &mut DepotRoutes, rng: &mut R) -> bool {
    if routes.is_empty() {
        return false;
    }
    let d = rng.random_range(0..routes.len());
    let len = routes[d].len();
    if len < 4 {
        return false;
    }
    let i = rng.random_range(0..len - 2);
    let j = rng.random_range(i + 1..len);
    routes[d][i..=j].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::random::create_rng;

    fn nodes(routes: &DepotRoutes) -> Vec<usize> {
        let mut all = routes.concat();
        all.sort();
        all
    }

    #[test]
    fn test_moves_preserve_node_set() {
        let mut rng = create_rng(42);
        let mut routes: DepotRoutes = vec![vec![3, 4, 5, 6], vec![7, 8], vec![]];
        let expected = nodes(&routes);
        for _ in 0..500 {
            RouteMove::random(&mut rng).apply(&mut routes, &mut rng);
            assert_eq!(nodes(&routes), expected);
        }
    }

    #[test]
    fn test_single_depot_rejects_cross_moves() {
        let mut rng = create_rng(1);
        let mut routes: DepotRoutes = vec![vec![1, 2, 3]];
        assert!(!RouteMove::SwapBetween.apply(&mut routes, &mut rng));
        assert!(!RouteMove::Relocate.apply(&mut routes, &mut rng));
        assert!(!RouteMove::Reverse.apply(&mut routes, &mut rng));
        assert_eq!(routes, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_swap_between_exchanges_depots() {
        let mut rng = create_rng(9);
        let mut routes: DepotRoutes = vec![vec![2], vec![3]];
        assert!(RouteMove::SwapBetween.apply(&mut routes, &mut rng));
        assert_eq!(routes, vec![vec![3], vec![2]]);
    }

    #[test]
    fn test_relocate_moves_one_node() {
        let mut rng = create_rng(5);
        let mut routes: DepotRoutes = vec![vec![2, 3], vec![4]];
        assert!(RouteMove::Relocate.apply(&mut routes, &mut rng));
        let sizes = (routes[0].len(), routes[1].len());
        assert!(sizes == (1, 2) || sizes == (3, 0));
    }

    #[test]
    fn test_swap_within_needs_two_nodes() {
        let mut rng = create_rng(5);
        let mut routes: DepotRoutes = vec![vec![2]];
        assert!(!RouteMove::SwapWithin.apply(&mut routes, &mut rng));
        let mut routes: DepotRoutes = vec![vec![2, 3]];
        assert!(RouteMove::SwapWithin.apply(&mut routes, &mut rng));
        assert_eq!(routes, vec![vec![3, 2]]);
    }

    #[test]
    fn test_reverse_changes_order() {
        let mut rng = create_rng(11);
        let mut routes: DepotRoutes = vec![vec![1, 2, 3, 4, 5]];
        assert!(RouteMove::Reverse.apply(&mut routes, &mut rng));
        assert_ne!(routes[0], vec![1, 2, 3, 4, 5]);
    }
}
