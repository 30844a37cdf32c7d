//! SHO configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the Spotted Hyena engine.
///
/// Defaults: 30 hyenas, 1000 iterations, `h` decreasing linearly from 5 to
/// 0, route distance weighted 0.6 structural / 0.4 order, greedy
/// post-processing enabled.
///
/// # Examples
///
/// ```
/// use u_routeswarm::sho::ShoConfig;
///
/// let config = ShoConfig::default()
///     .with_max_iterations(200)
///     .with_post_process(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShoConfig {
    pub population_size: usize,

    pub max_iterations: usize,

    /// Starting value of the encircling coefficient `h`.
    pub h_max: f64,

    /// When a route explores (`B > 1`), probability of a multi-route move
    /// instead of a single-route operator.
    pub multi_route_probability: f64,

    /// Weight of the structural term in the route distance; the order term
    /// gets the remainder.
    pub structural_weight: f64,

    /// Run the greedy nearest-neighbour reassignment after the search.
    pub post_process: bool,

    /// Perturbation steps applied to seed copies filling the initial pack.
    pub diversify_steps: usize,

    /// Whether to move hyenas concurrently using rayon.
    pub parallel: bool,

    pub seed: Option<u64>,
}

impl Default for ShoConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            max_iterations: 1000,
            h_max: 5.0,
            multi_route_probability: 0.5,
            structural_weight: 0.6,
            post_process: true,
            diversify_steps: 3,
            parallel: true,
            seed: None,
        }
    }
}

impl ShoConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_h_max(mut self, h: f64) -> Self {
        self.h_max = h;
        self
    }

    pub fn with_multi_route_probability(mut self, p: f64) -> Self {
        self.multi_route_probability = p;
        self
    }

    pub fn with_structural_weight(mut self, w: f64) -> Self {
        self.structural_weight = w;
        self
    }

    pub fn with_post_process(mut self, enabled: bool) -> Self {
        self.post_process = enabled;
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
        if !self.h_max.is_finite() || self.h_max < 0.0 {
            return Err(format!("h_max must be finite and non-negative, got {}", self.h_max));
        }
        for (name, p) in [
            ("multi_route_probability", self.multi_route_probability),
            ("structural_weight", self.structural_weight),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        Ok(())
    }
}
