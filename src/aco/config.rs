//! ACO configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the Ant Colony engine.
///
/// Defaults: 20 ants, 100 iterations, `alpha = 1`, `beta = 2`,
/// evaporation `rho = 0.1`, deposit constant `Q = 100`, trails in
/// `[0.1, 10]`. Every 10 iterations the best 30% of the colony is kept and
/// the rest restarts from mutated copies of the best ant.
///
/// # Examples
///
/// ```
/// use u_routeswarm::aco::AcoConfig;
///
/// let config = AcoConfig::default()
///     .with_colony_size(30)
///     .with_evaporation(0.2)
///     .with_seed(11);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcoConfig {
    /// Number of ants.
    pub colony_size: usize,

    pub max_iterations: usize,

    /// Pheromone exponent.
    pub alpha: f64,

    /// Heuristic (inverse distance) exponent.
    pub beta: f64,

    /// Evaporation rate `rho` in (0, 1).
    pub evaporation: f64,

    /// Deposit constant: the best tour gains `Q / best_fitness` per leg.
    pub q: f64,

    pub initial_pheromone: f64,
    pub min_pheromone: f64,
    pub max_pheromone: f64,

    /// Per-route probability of a pheromone-guided rebuild instead of a
    /// random toolkit operator.
    pub rebuild_probability: f64,

    /// Probability of one multi-route move per ant per iteration.
    pub multi_route_probability: f64,

    /// Diversify every this many iterations. 0 disables.
    pub diversify_interval: usize,

    /// Fraction of the colony kept as elite when diversifying.
    pub keep_fraction: f64,

    /// Perturbation steps applied to a copy of the best ant when
    /// diversifying or filling the initial colony.
    pub diversify_steps: usize,

    /// Whether to move ants concurrently using rayon.
    pub parallel: bool,

    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            colony_size: 20,
            max_iterations: 100,
            alpha: 1.0,
            beta: 2.0,
            evaporation: 0.1,
            q: 100.0,
            initial_pheromone: 0.1,
            min_pheromone: 0.1,
            max_pheromone: 10.0,
            rebuild_probability: 0.7,
            multi_route_probability: 0.5,
            diversify_interval: 10,
            keep_fraction: 0.3,
            diversify_steps: 3,
            parallel: true,
            seed: None,
        }
    }
}

impl AcoConfig {
    pub fn with_colony_size(mut self, n: usize) -> Self {
        self.colony_size = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the pheromone and heuristic exponents.
    pub fn with_exponents(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    pub fn with_evaporation(mut self, rho: f64) -> Self {
        self.evaporation = rho;
        self
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    /// Sets the initial trail level and the trail bounds.
    pub fn with_pheromone_bounds(mut self, initial: f64, min: f64, max: f64) -> Self {
        self.initial_pheromone = initial;
        self.min_pheromone = min;
        self.max_pheromone = max;
        self
    }

    pub fn with_rebuild_probability(mut self, p: f64) -> Self {
        self.rebuild_probability = p;
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
        if self.colony_size == 0 {
            return Err("colony_size must be positive".into());
        }
        if !self.alpha.is_finite()
            || !self.beta.is_finite()
            || self.alpha < 0.0
            || self.beta < 0.0
        {
            return Err("alpha and beta must be finite and non-negative".into());
        }
        if self.evaporation.is_nan() || self.evaporation <= 0.0 || self.evaporation >= 1.0 {
            return Err(format!(
                "evaporation must be in (0, 1), got {}",
                self.evaporation
            ));
        }
        if !self.q.is_finite() || self.q <= 0.0 {
            return Err(format!("q must be finite and positive, got {}", self.q));
        }
        if !self.min_pheromone.is_finite()
            || !self.max_pheromone.is_finite()
            || self.min_pheromone <= 0.0
            || self.min_pheromone > self.max_pheromone
        {
            return Err("pheromone bounds must satisfy 0 < min <= max < inf".into());
        }
        if !self.initial_pheromone.is_finite() {
            return Err(format!(
                "initial_pheromone must be finite, got {}",
                self.initial_pheromone
            ));
        }
        for (name, p) in [
            ("rebuild_probability", self.rebuild_probability),
            ("multi_route_probability", self.multi_route_probability),
            ("keep_fraction", self.keep_fraction),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = AcoConfig::default();
        assert_eq!(c.colony_size, 20);
        assert_eq!(c.max_iterations, 100);
        assert!((c.q - 100.0).abs() < 1e-10);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(AcoConfig::default().with_colony_size(0).validate().is_err());
        assert!(AcoConfig::default().with_evaporation(1.0).validate().is_err());
        assert!(AcoConfig::default()
            .with_pheromone_bounds(1.0, 5.0, 2.0)
            .validate()
            .is_err());
        assert!(AcoConfig::default()
            .with_rebuild_probability(-0.1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(AcoConfig::default()
            .with_pheromone_bounds(1.0, 0.1, f64::NAN)
            .validate()
            .is_err());
        assert!(AcoConfig::default()
            .with_pheromone_bounds(1.0, f64::NAN, 10.0)
            .validate()
            .is_err());
        assert!(AcoConfig::default()
            .with_pheromone_bounds(f64::NAN, 0.1, 10.0)
            .validate()
            .is_err());
        assert!(AcoConfig::default()
            .with_pheromone_bounds(1.0, 0.1, f64::INFINITY)
            .validate()
            .is_err());
        assert!(AcoConfig::default()
            .with_exponents(f64::NAN, 2.0)
            .validate()
            .is_err());
        assert!(AcoConfig::default()
            .with_exponents(1.0, f64::INFINITY)
            .validate()
            .is_err());
        assert!(AcoConfig::default()
            .with_evaporation(f64::NAN)
            .validate()
            .is_err());
        assert!(AcoConfig::default().with_q(f64::INFINITY).validate().is_err());
    }
}
