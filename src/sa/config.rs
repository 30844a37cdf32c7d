//! SA configuration and cooling schedules.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cooling schedule for temperature reduction.
///
/// # References
///
/// - Geometric: standard textbook approach
/// - Linear: fixed-duration cooling
/// - LundyMees: Lundy & Mees (1986), with convergence proof
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoolingSchedule {
    /// Geometric (exponential) cooling: `T_{k+1} = alpha * T_k`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Linear cooling: `T_k = T_0 - k * (T_0 - T_min) / max_steps`.
    ///
    /// `max_steps` is `max_iterations / iterations_per_temperature`, or 100
    /// levels when no iteration cap is set.
    Linear,

    /// Lundy-Mees cooling: `T_{k+1} = T_k / (1 + beta * T_k)`.
    ///
    /// One move per temperature level.
    LundyMees {
        /// Cooling parameter.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.95 }
    }
}

/// Configuration for the Simulated Annealing engine.
///
/// Defaults: `T0 = 100`, geometric `alpha = 0.95`, floor `0.1`, 1000 moves
/// per temperature level, even odds between a multi-route and a
/// single-route perturbation.
///
/// # Examples
///
/// ```
/// use u_routeswarm::sa::{SaConfig, CoolingSchedule};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(50.0)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.9 })
///     .with_iterations_per_temperature(200)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SaConfig {
    /// Initial temperature. Higher values allow more exploration.
    pub initial_temperature: f64,

    /// The search stops once the temperature falls to this floor.
    pub min_temperature: f64,

    pub cooling: CoolingSchedule,

    /// Moves tried at each temperature level (ignored by `LundyMees`).
    pub iterations_per_temperature: usize,

    /// Hard cap on total moves. 0 = no cap.
    pub max_iterations: usize,

    /// Probability of a multi-route move instead of a single-route
    /// operator, when at least two routes are in use.
    pub multi_route_probability: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            min_temperature: 0.1,
            cooling: CoolingSchedule::default(),
            iterations_per_temperature: 1000,
            max_iterations: 0,
            multi_route_probability: 0.5,
            seed: None,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_multi_route_probability(mut self, p: f64) -> Self {
        self.multi_route_probability = p;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.initial_temperature.is_finite() || self.initial_temperature <= 0.0 {
            return Err(format!(
                "initial_temperature must be finite and positive, got {}",
                self.initial_temperature
            ));
        }
        if !self.min_temperature.is_finite() || self.min_temperature <= 0.0 {
            return Err(format!(
                "min_temperature must be finite and positive, got {}",
                self.min_temperature
            ));
        }
        if self.min_temperature >= self.initial_temperature {
            return Err("min_temperature must be less than initial_temperature".into());
        }
        if self.iterations_per_temperature == 0 {
            return Err("iterations_per_temperature must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.multi_route_probability) {
            return Err(format!(
                "multi_route_probability must be in [0, 1], got {}",
                self.multi_route_probability
            ));
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
                    return Err(format!("geometric alpha must be in (0, 1), got {alpha}"));
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if !beta.is_finite() || beta <= 0.0 {
                    return Err(format!("lundy-mees beta must be positive, got {beta}"));
                }
            }
            CoolingSchedule::Linear => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SaConfig::default();
        assert!((config.initial_temperature - 100.0).abs() < 1e-10);
        assert!((config.min_temperature - 0.1).abs() < 1e-10);
        assert_eq!(config.iterations_per_temperature, 1000);
        assert!(matches!(
            config.cooling,
            CoolingSchedule::Geometric { alpha } if (alpha - 0.95).abs() < 1e-10
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_temperatures() {
        assert!(SaConfig::default()
            .with_initial_temperature(0.0)
            .validate()
            .is_err());
        assert!(SaConfig::default()
            .with_min_temperature(200.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(SaConfig::default()
            .with_initial_temperature(f64::INFINITY)
            .validate()
            .is_err());
        assert!(SaConfig::default()
            .with_initial_temperature(f64::NAN)
            .validate()
            .is_err());
        assert!(SaConfig::default()
            .with_min_temperature(f64::NAN)
            .validate()
            .is_err());
        assert!(SaConfig::default()
            .with_cooling(CoolingSchedule::Geometric { alpha: f64::NAN })
            .validate()
            .is_err());
        assert!(SaConfig::default()
            .with_cooling(CoolingSchedule::LundyMees { beta: f64::INFINITY })
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_cooling() {
        let bad = SaConfig::default().with_cooling(CoolingSchedule::Geometric { alpha: 1.0 });
        assert!(bad.validate().is_err());
        let bad = SaConfig::default().with_cooling(CoolingSchedule::LundyMees { beta: 0.0 });
        assert!(bad.validate().is_err());
        let ok = SaConfig::default().with_cooling(CoolingSchedule::Linear);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_validate_probability() {
        assert!(SaConfig::default()
            .with_multi_route_probability(1.5)
            .validate()
            .is_err());
    }
}
