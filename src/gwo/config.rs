//! GWO configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the Grey Wolf engine.
///
/// Defaults: 30 wolves, 100 iterations, `a` decreasing linearly from 2 to
/// 0. Every 10 iterations the best 30% of the pack is kept and the rest is
/// rebuilt from a leader (alpha 60%, beta 20%, delta 20%).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GwoConfig {
    pub population_size: usize,

    pub max_iterations: usize,

    /// Starting value of the coefficient `a`.
    pub a_max: f64,

    /// Probability of one extra random toolkit operator on every route
    /// after the leader move.
    pub random_op_probability: f64,

    /// Probability of one multi-route move per wolf per iteration.
    pub multi_route_probability: f64,

    /// Diversify every this many iterations. 0 disables.
    pub diversify_interval: usize,

    /// Fraction of the pack kept when diversifying.
    pub keep_fraction: f64,

    /// Relative odds of rebuilding from alpha, beta and delta.
    pub leader_weights: [f64; 3],

    /// Perturbation steps applied to a leader copy when diversifying or
    /// filling the initial pack.
    pub diversify_steps: usize,

    /// Whether to move wolves concurrently using rayon.
    pub parallel: bool,

    pub seed: Option<u64>,
}

impl Default for GwoConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            max_iterations: 100,
            a_max: 2.0,
            random_op_probability: 0.5,
            multi_route_probability: 0.3,
            diversify_interval: 10,
            keep_fraction: 0.3,
            leader_weights: [0.6, 0.2, 0.2],
            diversify_steps: 3,
            parallel: true,
            seed: None,
        }
    }
}

impl GwoConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_a_max(mut self, a: f64) -> Self {
        self.a_max = a;
        self
    }

    pub fn with_random_op_probability(mut self, p: f64) -> Self {
        self.random_op_probability = p;
        self
    }

    pub fn with_multi_route_probability(mut self, p: f64) -> Self {
        self.multi_route_probability = p;
        self
    }

    pub fn with_diversify_interval(mut self, n: usize) -> Self {
        self.diversify_interval = n;
        self
    }

    pub fn with_keep_fraction(mut self, f: f64) -> Self {
        self.keep_fraction = f.clamp(0.0, 1.0);
        self
    }

    pub fn with_leader_weights(mut self, weights: [f64; 3]) -> Self {
        self.leader_weights = weights;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size == 0 {
            return Err("population_size must be positive".into());
        }
        if !self.a_max.is_finite() || self.a_max < 0.0 {
            return Err(format!("a_max must be finite and non-negative, got {}", self.a_max));
        }
        for (name, p) in [
            ("random_op_probability", self.random_op_probability),
            ("multi_route_probability", self.multi_route_probability),
            ("keep_fraction", self.keep_fraction),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        if self.leader_weights.iter().any(|w| !w.is_finite() || *w < 0.0)
            || self.leader_weights.iter().sum::<f64>() <= 0.0
        {
            return Err("leader_weights must be finite, non-negative, with a positive sum".into());
        }
        Ok(())
    }
}
