//! Single-route neighborhood operators.
//!
//! Every operator works on a route's stop sequence in place and is a no-op
//! on sequences shorter than 2. Callers re-check feasibility afterwards and
//! restore the pre-mutation clone on failure.

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Deterministic moves
// ============================================================================

/// Exchanges the stops at positions `i` and `j`.
pub fn swap(stops: &mut [usize], i: usize, j: usize) {
    if stops.len() < 2 {
        return;
    }
    stops.swap(i, j);
}

/// Moves the stop at `from` to `to`, keeping the relative order of the rest.
///
/// Implemented as a rotation of the span between the two positions.
pub fn insert(stops: &mut [usize], from: usize, to: usize) {
    if stops.len() < 2 {
        return;
    }
    if from < to {
        stops[from..=to].rotate_left(1);
    } else if to < from {
        stops[to..=from].rotate_right(1);
    }
}

/// Reverses the span between `i` and `j` (inclusive, in either order).
///
/// Applying it twice with the same bounds restores the sequence.
pub fn reverse(stops: &mut [usize], i: usize, j: usize) {
    if stops.len() < 2 {
        return;
    }
    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
    stops[lo..=hi].reverse();
}

// ============================================================================
// Randomized moves
// ============================================================================

/// Swap at two distinct random positions.
pub fn random_swap<R: Rng>(stops: &mut [usize], rng: &mut R) {
    if let Some((i, j)) = distinct_pair(stops.len(), rng) {
        swap(stops, i, j);
    }
}

/// Insert from one random position to another.
pub fn random_insert<R: Rng>(stops: &mut [usize], rng: &mut R) {
    if let Some((i, j)) = distinct_pair(stops.len(), rng) {
        insert(stops, i, j);
    }
}

/// Reverse between two random positions.
pub fn random_reverse<R: Rng>(stops: &mut [usize], rng: &mut R) {
    if let Some((i, j)) = distinct_pair(stops.len(), rng) {
        reverse(stops, i, j);
    }
}

/// Between 1 and 10 consecutive random swaps.
pub fn swap_sequence<R: Rng>(stops: &mut [usize], rng: &mut R) {
    if stops.len() < 2 {
        return;
    }
    let n = rng.random_range(1..=10);
    for _ in 0..n {
        random_swap(stops, rng);
    }
}

/// The single-route toolkit.
///
/// # Examples
///
/// ```
/// use u_routeswarm::operators::Operator;
/// use u_routeswarm::random::create_rng;
///
/// let mut rng = create_rng(1);
/// let mut stops = vec![1, 2, 3, 4];
/// let op = Operator::apply_random(&mut stops, &mut rng);
/// let mut sorted = stops.clone();
/// sorted.sort();
/// assert_eq!(sorted, vec![1, 2, 3, 4]);
/// # let _ = op;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operator {
    Swap,
    Insert,
    Reverse,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Swap, Operator::Insert, Operator::Reverse];

    /// Uniformly picks one operator.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Applies this operator at random positions.
    pub fn apply<R: Rng>(self, stops: &mut [usize], rng: &mut R) {
        match self {
            Operator::Swap => random_swap(stops, rng),
            Operator::Insert => random_insert(stops, rng),
            Operator::Reverse => random_reverse(stops, rng),
        }
    }

    /// Picks an operator at random and applies it. Returns the one used.
    pub fn apply_random<R: Rng>(stops: &mut [usize], rng: &mut R) -> Self {
        let op = Self::random(rng);
        op.apply(stops, rng);
        op
    }
}

// ============================================================================
// Repair
// ============================================================================

/// Clamps every stop into `[1, num_locations)`.
///
/// Numeric position updates (GWO, WOA) round continuous values that can
/// land outside the valid range.
pub fn clamp_indices(stops: &mut [usize], num_locations: usize) {
    let max = num_locations.saturating_sub(1).max(1);
    for s in stops.iter_mut() {
        *s = (*s).clamp(1, max);
    }
}

/// Turns `candidate` back into a permutation of `original`.
///
/// Keeps the first occurrence of each stop that belongs to `original`, drops
/// duplicates and foreign stops, and fills the freed positions with the
/// missing stops in their `original` order.
pub fn repair_permutation(candidate: &[usize], original: &[usize]) -> Vec<usize> {
    let mut remaining: Vec<usize> = original.to_vec();
    let mut out: Vec<Option<usize>> = Vec::with_capacity(original.len());

    for &c in candidate.iter().take(original.len()) {
        match remaining.iter().position(|&r| r == c) {
            Some(k) => {
                remaining.remove(k);
                out.push(Some(c));
            }
            None => out.push(None),
        }
    }
    out.resize(original.len(), None);

    let mut fill = remaining.into_iter();
    out.into_iter()
        .filter_map(|slot| slot.or_else(|| fill.next()))
        .collect()
}

// ============================================================================
// Helpers
// ============================================================================

/// Two distinct positions in `0..n`, or `None` when `n < 2`.
pub(crate) fn distinct_pair<R: Rng>(n: usize, rng: &mut R) -> Option<(usize, usize)> {
    if n < 2 {
        return None;
    }
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    Some((i, j))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn sorted(v: &[usize]) -> Vec<usize> {
        let mut s = v.to_vec();
        s.sort_unstable();
        s
    }

    #[test]
    fn test_swap_positions() {
        let mut s = vec![1, 2, 3, 4];
        swap(&mut s, 0, 3);
        assert_eq!(s, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_insert_forward_and_backward() {
        let mut s = vec![1, 2, 3, 4, 5];
        insert(&mut s, 1, 3);
        assert_eq!(s, vec![1, 3, 4, 2, 5]);

        let mut s = vec![1, 2, 3, 4, 5];
        insert(&mut s, 3, 1);
        assert_eq!(s, vec![1, 4, 2, 3, 5]);
    }

    #[test]
    fn test_reverse_unordered_bounds() {
        let mut s = vec![1, 2, 3, 4, 5];
        reverse(&mut s, 3, 1);
        assert_eq!(s, vec![1, 4, 3, 2, 5]);
        reverse(&mut s, 1, 3);
        assert_eq!(s, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_short_routes_untouched() {
        let mut rng = create_rng(42);
        let mut one = vec![7];
        for op in Operator::ALL {
            op.apply(&mut one, &mut rng);
        }
        swap_sequence(&mut one, &mut rng);
        assert_eq!(one, vec![7]);

        let mut empty: Vec<usize> = Vec::new();
        Operator::apply_random(&mut empty, &mut rng);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_random_ops_preserve_multiset() {
        let mut rng = create_rng(42);
        let mut s: Vec<usize> = (1..=9).collect();
        for _ in 0..200 {
            Operator::apply_random(&mut s, &mut rng);
            swap_sequence(&mut s, &mut rng);
        }
        assert_eq!(sorted(&s), (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_swap_changes_two_positions() {
        let mut rng = create_rng(7);
        for _ in 0..50 {
            let mut s = vec![1, 2, 3, 4, 5];
            random_swap(&mut s, &mut rng);
            let moved = s.iter().zip(1..=5).filter(|(a, b)| **a != *b).count();
            assert_eq!(moved, 2);
        }
    }

    #[test]
    fn test_clamp_indices() {
        let mut s = vec![0, 3, 12, 5];
        clamp_indices(&mut s, 6);
        assert_eq!(s, vec![1, 3, 5, 5]);
    }

    #[test]
    fn test_repair_permutation() {
        let original = vec![4, 2, 7, 9];
        let repaired = repair_permutation(&[2, 2, 8, 4], &original);
        assert_eq!(repaired, vec![2, 7, 9, 4]);
        assert_eq!(sorted(&repaired), sorted(&original));

        let short = repair_permutation(&[9], &original);
        assert_eq!(short, vec![9, 4, 2, 7]);
    }

    #[test]
    fn test_distinct_pair() {
        let mut rng = create_rng(3);
        assert!(distinct_pair(1, &mut rng).is_none());
        for _ in 0..100 {
            let (i, j) = distinct_pair(2, &mut rng).expect("pair");
            assert_ne!(i, j);
        }
    }
}
