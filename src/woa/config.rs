//! WOA configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the Whale engine.
///
/// Defaults: 30 whales, 100 iterations, `a` decreasing linearly from 2 to
/// 0, logarithmic spiral constant `b = 1`, even odds between the
/// encircle/explore branch and the spiral branch.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WoaConfig {
    pub population_size: usize,

    pub max_iterations: usize,

    /// Starting value of the coefficient `a`.
    pub a_max: f64,

    /// Shape of the logarithmic spiral.
    pub spiral_b: f64,

    /// Probability of the spiral branch instead of encircling/exploring.
    pub spiral_probability: f64,

    /// When exploring, probability of a multi-route move instead of a
    /// single-route operator.
    pub multi_route_probability: f64,

    /// Perturbation steps applied to seed copies filling the initial pod.
    pub diversify_steps: usize,

    /// Whether to move whales concurrently using rayon.
    pub parallel: bool,

    pub seed: Option<u64>,
}

impl Default for WoaConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            max_iterations: 100,
            a_max: 2.0,
            spiral_b: 1.0,
            spiral_probability: 0.5,
            multi_route_probability: 0.5,
            diversify_steps: 3,
            parallel: true,
            seed: None,
        }
    }
}

impl WoaConfig {
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

    pub fn with_spiral_b(mut self, b: f64) -> Self {
        self.spiral_b = b;
        self
    }

    pub fn with_spiral_probability(mut self, p: f64) -> Self {
        self.spiral_probability = p;
        self
    }

    pub fn with_multi_route_probability(mut self, p: f64) -> Self {
        self.multi_route_probability = p;
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
        if !self.spiral_b.is_finite() {
            return Err("spiral_b must be finite".into());
        }
        for (name, p) in [
            ("spiral_probability", self.spiral_probability),
            ("multi_route_probability", self.multi_route_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        Ok(())
    }
}
