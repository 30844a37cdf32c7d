//! Continuous position updates over route index sequences.
//!
//! GWO and WOA treat a route's stop indices as coordinates: a route moves
//! toward a leader's route of the same vehicle slot, position by position,
//! and the continuous result is rounded back onto location indices. The
//! rounded sequence is then repaired into a permutation of the route's own
//! stops so customer coverage is preserved.

use crate::operators::repair_permutation;

/// How a rounded coordinate outside `[1, num_locations)` is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    /// Clamp to the nearest valid index.
    Clamp,
    /// Keep the route's current value at that position.
    Keep,
}

/// Mean of `|c * leader[k] - current[k]|` over the common prefix.
///
/// 0 when either sequence is empty.
pub fn mean_gap(current: &[usize], leader: &[usize], c: f64) -> f64 {
    let n = current.len().min(leader.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = current
        .iter()
        .zip(leader)
        .map(|(&x, &l)| (c * l as f64 - x as f64).abs())
        .sum();
    sum / n as f64
}

/// `leader[k] - a * d` for every position of `leader`.
pub fn step_toward(leader: &[usize], a: f64, d: f64) -> Vec<f64> {
    leader.iter().map(|&l| l as f64 - a * d).collect()
}

/// Element-wise mean of several coordinate vectors over their common
/// prefix.
pub fn mean_position(positions: &[Vec<f64>]) -> Vec<f64> {
    if positions.is_empty() {
        return Vec::new();
    }
    let n = positions.iter().map(Vec::len).min().unwrap_or(0);
    let m = positions.len() as f64;
    (0..n)
        .map(|k| positions.iter().map(|p| p[k]).sum::<f64>() / m)
        .collect()
}

/// Rounds `positions` onto the first positions of `current` and repairs
/// the result into a permutation of `current`.
///
/// Positions past the end of `positions`, and non-finite values, keep the
/// current stop.
pub fn settle(
    current: &[usize],
    positions: &[f64],
    num_locations: usize,
    policy: OutOfRange,
) -> Vec<usize> {
    let max = num_locations.saturating_sub(1).max(1) as f64;
    let candidate: Vec<usize> = current
        .iter()
        .enumerate()
        .map(|(k, &stop)| match positions.get(k) {
            Some(p) if p.is_finite() => {
                let r = p.round();
                if (1.0..=max).contains(&r) {
                    r as usize
                } else {
                    match policy {
                        OutOfRange::Clamp => r.clamp(1.0, max) as usize,
                        OutOfRange::Keep => stop,
                    }
                }
            }
            _ => stop,
        })
        .collect();
    repair_permutation(&candidate, current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(v: &[usize]) -> Vec<usize> {
        let mut s = v.to_vec();
        s.sort_unstable();
        s
    }

    #[test]
    fn test_mean_gap() {
        assert_eq!(mean_gap(&[], &[1, 2], 1.0), 0.0);
        // |2*1 - 3| + |2*2 - 1| = 1 + 3
        assert!((mean_gap(&[3, 1, 9], &[1, 2], 2.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_and_mean() {
        let a = step_toward(&[4, 6], 0.5, 2.0);
        assert_eq!(a, vec![3.0, 5.0]);
        let m = mean_position(&[vec![1.0, 2.0, 3.0], vec![3.0, 4.0]]);
        assert_eq!(m, vec![2.0, 3.0]);
        assert!(mean_position(&[]).is_empty());
    }

    #[test]
    fn test_settle_is_permutation_of_current() {
        let current = vec![5, 2, 7, 3];
        let out = settle(&current, &[7.2, 7.4, -3.0], 8, OutOfRange::Clamp);
        assert_eq!(sorted(&out), sorted(&current));
        assert_eq!(out[0], 7);
    }

    #[test]
    fn test_settle_policies() {
        let current = vec![2, 3];
        // 9.0 is outside [1, 6)
        assert_eq!(settle(&current, &[9.0, 2.0], 6, OutOfRange::Keep), vec![2, 3]);
        // clamped to 5, which is not one of the route's stops
        assert_eq!(settle(&current, &[9.0, 2.0], 6, OutOfRange::Clamp), vec![3, 2]);
        assert_eq!(settle(&current, &[3.2, 2.0], 6, OutOfRange::Keep), vec![3, 2]);
        assert_eq!(settle(&current, &[f64::NAN], 6, OutOfRange::Clamp), vec![2, 3]);
    }
}
