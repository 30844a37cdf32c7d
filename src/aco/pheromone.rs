//! Pheromone trails and the inverse-distance heuristic.

use rand::Rng;

use crate::instance::Instance;
use crate::models::Solution;

/// Dense pheromone and heuristic matrices over location pairs.
///
/// Trails are symmetric and always kept within `[min, max]`. The heuristic
/// is `1 / distance`, or 0 for co-located pairs.
#[derive(Debug, Clone)]
pub struct PheromoneMatrix {
    size: usize,
    trails: Vec<f64>,
    heuristic: Vec<f64>,
    min: f64,
    max: f64,
}

impl PheromoneMatrix {
    /// Trails start at `initial`, clamped into `[min, max]`.
    pub fn new(instance: &Instance, initial: f64, min: f64, max: f64) -> Self {
        let size = instance.num_locations();
        let start = initial.max(min).min(max);
        let mut trails = vec![start; size * size];
        let mut heuristic = vec![0.0; size * size];
        for i in 0..size {
            trails[i * size + i] = 0.0;
            for j in 0..size {
                if i == j {
                    continue;
                }
                let d = instance.distance(i, j);
                if d > 0.0 {
                    heuristic[i * size + j] = 1.0 / d;
                }
            }
        }
        Self {
            size,
            trails,
            heuristic,
            min,
            max,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn trail(&self, from: usize, to: usize) -> f64 {
        self.trails[from * self.size + to]
    }

    #[inline]
    pub fn heuristic(&self, from: usize, to: usize) -> f64 {
        self.heuristic[from * self.size + to]
    }

    /// `trail^alpha * heuristic^beta`.
    pub fn attractiveness(&self, from: usize, to: usize, alpha: f64, beta: f64) -> f64 {
        self.trail(from, to).powf(alpha) * self.heuristic(from, to).powf(beta)
    }

    /// Multiplies every trail by `1 - rho`, floored at the minimum.
    pub fn evaporate(&mut self, rho: f64) {
        let keep = 1.0 - rho;
        for i in 0..self.size {
            for j in 0..self.size {
                if i != j {
                    let t = &mut self.trails[i * self.size + j];
                    *t = (*t * keep).max(self.min);
                }
            }
        }
    }

    /// Adds `amount` on both directions of every leg of `solution`,
    /// depot legs included, capped at the maximum.
    pub fn deposit(&mut self, solution: &Solution, amount: f64) {
        for route in solution.routes().iter().filter(|r| !r.is_empty()) {
            let mut prev = 0;
            for &stop in route.stops().iter().chain(std::iter::once(&0)) {
                if prev != stop {
                    self.reinforce(prev, stop, amount);
                    self.reinforce(stop, prev, amount);
                }
                prev = stop;
            }
        }
    }

    fn reinforce(&mut self, from: usize, to: usize, amount: f64) {
        let t = &mut self.trails[from * self.size + to];
        *t = (*t + amount).min(self.max);
    }

    /// Rebuilds the visiting order of `stops` starting from the depot.
    ///
    /// Each next stop is drawn among the unvisited ones with probability
    /// proportional to [`attractiveness`](Self::attractiveness). Falls back
    /// to a uniform draw when every candidate has zero attractiveness.
    pub fn construct<R: Rng>(&self, stops: &[usize], alpha: f64, beta: f64, rng: &mut R) -> Vec<usize> {
        let mut unvisited = stops.to_vec();
        let mut order = Vec::with_capacity(stops.len());
        let mut weights = Vec::with_capacity(stops.len());
        let mut current = 0;

        while !unvisited.is_empty() {
            let pick = if unvisited.len() == 1 {
                0
            } else {
                weights.clear();
                weights.extend(
                    unvisited
                        .iter()
                        .map(|&next| self.attractiveness(current, next, alpha, beta)),
                );
                roulette(&weights, rng)
            };
            let next = unvisited.swap_remove(pick);
            order.push(next);
            current = next;
        }
        order
    }
}

/// Roulette-wheel draw over non-negative weights.
fn roulette<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().filter(|w| w.is_finite()).sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.random_range(0..weights.len());
    }
    let target = rng.random::<f64>() * total;
    let mut acc = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w.is_finite() {
            acc += w;
        }
        if target <= acc {
            return i;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{line_instance, line_seed};
    use crate::random::create_rng;

    #[test]
    fn test_new_clamps_initial_and_builds_heuristic() {
        let inst = line_instance(4, 10.0);
        let p = PheromoneMatrix::new(&inst, 0.01, 0.1, 10.0);
        assert_eq!(p.size(), 5);
        assert!((p.trail(0, 1) - 0.1).abs() < 1e-12);
        assert_eq!(p.trail(2, 2), 0.0);
        assert!((p.heuristic(0, 1) - 1.0 / inst.distance(0, 1)).abs() < 1e-12);
    }

    #[test]
    fn test_evaporate_floors_at_min() {
        let inst = line_instance(3, 10.0);
        let mut p = PheromoneMatrix::new(&inst, 1.0, 0.1, 10.0);
        p.evaporate(0.5);
        assert!((p.trail(1, 2) - 0.5).abs() < 1e-12);
        for _ in 0..20 {
            p.evaporate(0.5);
        }
        assert!((p.trail(1, 2) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_deposit_is_symmetric_and_capped() {
        let inst = line_instance(4, 20.0);
        let sol = line_seed(&inst, 1);
        let mut p = PheromoneMatrix::new(&inst, 0.1, 0.1, 10.0);
        p.deposit(&sol, 2.0);
        assert!((p.trail(0, 1) - 2.1).abs() < 1e-12);
        assert!((p.trail(1, 0) - 2.1).abs() < 1e-12);
        assert!((p.trail(4, 0) - 2.1).abs() < 1e-12);
        assert!((p.trail(1, 3) - 0.1).abs() < 1e-12);
        for _ in 0..10 {
            p.deposit(&sol, 5.0);
        }
        assert!((p.trail(2, 3) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_construct_is_permutation() {
        let inst = line_instance(8, 20.0);
        let p = PheromoneMatrix::new(&inst, 0.1, 0.1, 10.0);
        let mut rng = create_rng(42);
        let stops = vec![3, 7, 1, 5, 2];
        let order = p.construct(&stops, 1.0, 2.0, &mut rng);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 5, 7]);
    }

    #[test]
    fn test_construct_follows_strong_trail() {
        let inst = line_instance(4, 20.0);
        let mut p = PheromoneMatrix::new(&inst, 0.1, 0.1, 1e9);
        let mut target = line_seed(&inst, 1);
        target.route_mut(0).set_stops(vec![3, 1, 4, 2], &inst).expect("indices in range");
        p.deposit(&target, 1e8);
        let mut rng = create_rng(3);
        let order = p.construct(&[1, 2, 3, 4], 1.0, 0.0, &mut rng);
        // The closed tour is symmetric, so either direction is reinforced.
        assert!(order == vec![3, 1, 4, 2] || order == vec![2, 4, 1, 3], "{order:?}");
    }

    #[test]
    fn test_roulette_uniform_on_zero_weights() {
        let mut rng = create_rng(1);
        for _ in 0..50 {
            assert!(roulette(&[0.0, 0.0, 0.0], &mut rng) < 3);
        }
        assert_eq!(roulette(&[0.0, 1.0, 0.0], &mut rng), 1);
    }
}
