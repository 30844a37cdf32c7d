//! Common engine layer.
//!
//! Every engine follows the same lifecycle: build a population from the
//! seed solutions, evaluate, rank, then iterate a fixed number of times
//! {move each agent, revert infeasible routes, re-evaluate, update the
//! leaders}, and finally return the best solution found. Engines accept
//! only improvements into their best-so-far, so the returned solution is
//! never worse than the best seed.
//!
//! [`EngineSpec`] is the closed set of engines and their configurations;
//! the orchestrator dispatches through it.

mod context;
pub mod moves;
pub mod position;

use crate::aco::{AcoConfig, AcoRunner};
use crate::error::RoutingError;
use crate::gwo::{GwoConfig, GwoRunner};
use crate::models::Solution;
use crate::sa::{SaConfig, SaRunner};
use crate::sho::{ShoConfig, ShoRunner};
use crate::woa::{WoaConfig, WoaRunner};

pub use context::SearchContext;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies an engine. Also tags the agents it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EngineKind {
    SimulatedAnnealing,
    AntColony,
    GreyWolf,
    Whale,
    SpottedHyena,
}

impl EngineKind {
    pub const ALL: [EngineKind; 5] = [
        EngineKind::SimulatedAnnealing,
        EngineKind::AntColony,
        EngineKind::GreyWolf,
        EngineKind::Whale,
        EngineKind::SpottedHyena,
    ];

    /// Short name: `SA`, `ACO`, `GWO`, `WOA` or `SHO`.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            EngineKind::SimulatedAnnealing => "SA",
            EngineKind::AntColony => "ACO",
            EngineKind::GreyWolf => "GWO",
            EngineKind::Whale => "WOA",
            EngineKind::SpottedHyena => "SHO",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Outcome of one engine trial.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineResult {
    pub kind: EngineKind,

    /// Best solution found (never worse than the best seed).
    pub best: Solution,

    pub best_fitness: f64,

    /// Fitness of the best seed, for improvement reporting.
    pub seed_fitness: f64,

    /// Iterations completed.
    pub iterations: usize,

    /// Whether the run stopped on the cancel flag or deadline.
    pub cancelled: bool,

    /// Best fitness after initialization and after every iteration
    /// (every temperature level for SA).
    pub fitness_history: Vec<f64>,
}

impl EngineResult {
    /// Relative improvement over the seed, in `[0, 1]`.
    pub fn improvement(&self) -> f64 {
        if self.seed_fitness > 0.0 && self.seed_fitness.is_finite() {
            (self.seed_fitness - self.best_fitness) / self.seed_fitness
        } else {
            0.0
        }
    }
}

/// One engine with its configuration.
///
/// # Examples
///
/// ```
/// use u_routeswarm::engine::{EngineKind, EngineSpec};
/// use u_routeswarm::gwo::GwoConfig;
///
/// let spec = EngineSpec::Gwo(GwoConfig::default().with_max_iterations(20));
/// assert_eq!(spec.kind(), EngineKind::GreyWolf);
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EngineSpec {
    Sa(SaConfig),
    Aco(AcoConfig),
    Gwo(GwoConfig),
    Woa(WoaConfig),
    Sho(ShoConfig),
}

impl EngineSpec {
    /// All five engines with their default configurations.
    pub fn all_default() -> Vec<EngineSpec> {
        vec![
            EngineSpec::Sa(SaConfig::default()),
            EngineSpec::Aco(AcoConfig::default()),
            EngineSpec::Gwo(GwoConfig::default()),
            EngineSpec::Woa(WoaConfig::default()),
            EngineSpec::Sho(ShoConfig::default()),
        ]
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            EngineSpec::Sa(_) => EngineKind::SimulatedAnnealing,
            EngineSpec::Aco(_) => EngineKind::AntColony,
            EngineSpec::Gwo(_) => EngineKind::GreyWolf,
            EngineSpec::Woa(_) => EngineKind::Whale,
            EngineSpec::Sho(_) => EngineKind::SpottedHyena,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), RoutingError> {
        let r = match self {
            EngineSpec::Sa(c) => c.validate(),
            EngineSpec::Aco(c) => c.validate(),
            EngineSpec::Gwo(c) => c.validate(),
            EngineSpec::Woa(c) => c.validate(),
            EngineSpec::Sho(c) => c.validate(),
        };
        r.map_err(|reason| RoutingError::InvalidConfig {
            engine: self.kind(),
            reason,
        })
    }

    /// Returns a copy with the RNG seed replaced.
    pub fn with_seed(&self, seed: u64) -> Self {
        match self {
            EngineSpec::Sa(c) => EngineSpec::Sa(c.clone().with_seed(seed)),
            EngineSpec::Aco(c) => EngineSpec::Aco(c.clone().with_seed(seed)),
            EngineSpec::Gwo(c) => EngineSpec::Gwo(c.clone().with_seed(seed)),
            EngineSpec::Woa(c) => EngineSpec::Woa(c.clone().with_seed(seed)),
            EngineSpec::Sho(c) => EngineSpec::Sho(c.clone().with_seed(seed)),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        match self {
            EngineSpec::Sa(c) => c.seed,
            EngineSpec::Aco(c) => c.seed,
            EngineSpec::Gwo(c) => c.seed,
            EngineSpec::Woa(c) => c.seed,
            EngineSpec::Sho(c) => c.seed,
        }
    }

    /// Runs the engine over `seeds`.
    pub fn run(
        &self,
        ctx: &SearchContext<'_>,
        seeds: &[Solution],
    ) -> Result<EngineResult, RoutingError> {
        match self {
            EngineSpec::Sa(c) => SaRunner::run(ctx, seeds, c).map(EngineResult::from),
            EngineSpec::Aco(c) => AcoRunner::run(ctx, seeds, c),
            EngineSpec::Gwo(c) => GwoRunner::run(ctx, seeds, c),
            EngineSpec::Woa(c) => WoaRunner::run(ctx, seeds, c),
            EngineSpec::Sho(c) => ShoRunner::run(ctx, seeds, c),
        }
    }
}

/// Lifts a config validation message into [`RoutingError::InvalidConfig`].
pub(crate) fn check_config(
    engine: EngineKind,
    validated: Result<(), String>,
) -> Result<(), RoutingError> {
    validated.map_err(|reason| RoutingError::InvalidConfig { engine, reason })
}
