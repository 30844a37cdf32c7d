//! SA execution loop.

use rand::Rng;

use super::config::{CoolingSchedule, SaConfig};
use crate::engine::moves::{best_seed, perturb, validate_seeds};
use crate::engine::{check_config, EngineKind, EngineResult, SearchContext};
use crate::error::RoutingError;
use crate::events::{EventKind, Phase};
use crate::models::Solution;
use crate::random::rng_from;

const KIND: EngineKind = EngineKind::SimulatedAnnealing;

/// Result of a Simulated Annealing run.
#[derive(Debug, Clone)]
pub struct SaResult {
    /// The best solution found.
    pub best: Solution,

    pub best_fitness: f64,

    /// Fitness of the starting solution.
    pub seed_fitness: f64,

    /// Total number of moves tried.
    pub iterations: usize,

    /// Number of temperature levels completed.
    pub temperature_levels: usize,

    /// Final temperature when the algorithm stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of improving moves.
    pub improving_moves: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best fitness at the start and after every temperature level.
    pub fitness_history: Vec<f64>,
}

impl From<SaResult> for EngineResult {
    fn from(r: SaResult) -> Self {
        EngineResult {
            kind: KIND,
            best: r.best,
            best_fitness: r.best_fitness,
            seed_fitness: r.seed_fitness,
            iterations: r.iterations,
            cancelled: r.cancelled,
            fitness_history: r.fitness_history,
        }
    }
}

/// Executes the Simulated Annealing engine.
pub struct SaRunner;

impl SaRunner {
    /// Anneals from the best of `seeds`.
    pub fn run(
        ctx: &SearchContext<'_>,
        seeds: &[Solution],
        config: &SaConfig,
    ) -> Result<SaResult, RoutingError> {
        anneal(ctx, seeds, config, |_| {})
    }

    /// Anneals from the best of `seeds` and returns the current solution as
    /// it stood at the end of every temperature level.
    ///
    /// Turns one initial solution into a seed population for the
    /// population engines.
    pub fn trajectory(
        ctx: &SearchContext<'_>,
        seeds: &[Solution],
        config: &SaConfig,
    ) -> Result<Vec<Solution>, RoutingError> {
        let mut snapshots = Vec::new();
        anneal(ctx, seeds, config, |current| snapshots.push(current.clone()))?;
        Ok(snapshots)
    }
}

fn anneal(
    ctx: &SearchContext<'_>,
    seeds: &[Solution],
    config: &SaConfig,
    mut on_level: impl FnMut(&Solution),
) -> Result<SaResult, RoutingError> {
    check_config(KIND, config.validate())?;
    let instance = ctx.instance();
    validate_seeds(seeds, instance)?;
    let mut rng = rng_from(config.seed);

    ctx.emit(KIND, EventKind::Phase { phase: Phase::Init });
    let mut current = best_seed(ctx, seeds).ok_or(RoutingError::NoVehicles)?;
    let seed_fitness = current.fitness();
    let mut best = current.clone();

    let mut temperature = config.initial_temperature;
    let mut total_iterations = 0usize;
    let mut accepted_moves = 0usize;
    let mut improving_moves = 0usize;
    let mut cancelled = false;
    let linear_max_steps = compute_linear_steps(config);
    let mut fitness_history = vec![best.fitness()];
    let mut step = 0usize;

    ctx.emit(KIND, EventKind::Phase { phase: Phase::Search });
    while temperature > config.min_temperature {
        if ctx.should_stop() {
            cancelled = true;
            break;
        }

        let inner_iters = match config.cooling {
            CoolingSchedule::LundyMees { .. } => 1,
            _ => config.iterations_per_temperature,
        };

        for _ in 0..inner_iters {
            if config.max_iterations > 0 && total_iterations >= config.max_iterations {
                break;
            }
            if ctx.should_stop() {
                cancelled = true;
                break;
            }
            total_iterations += 1;

            let mut neighbor = current.clone();
            if !perturb(&mut neighbor, instance, config.multi_route_probability, &mut rng) {
                continue;
            }
            let delta = ctx.evaluator().evaluate(&mut neighbor) - current.fitness();

            // Metropolis acceptance criterion
            let accept = if delta < 0.0 {
                improving_moves += 1;
                true
            } else {
                rng.random_range(0.0..1.0) < (-delta / temperature).exp()
            };

            if accept {
                current = neighbor;
                accepted_moves += 1;
                if current.fitness() < best.fitness() {
                    best = current.clone();
                    ctx.emit(
                        KIND,
                        EventKind::NewBest {
                            iteration: total_iterations,
                            fitness: best.fitness(),
                        },
                    );
                }
            }
        }

        if cancelled {
            fitness_history.push(best.fitness());
            break;
        }

        on_level(&current);
        fitness_history.push(best.fitness());
        ctx.progress(KIND, step, best.fitness());

        if config.max_iterations > 0 && total_iterations >= config.max_iterations {
            break;
        }

        temperature = cool(temperature, config, step, linear_max_steps);
        step += 1;
    }

    Ok(SaResult {
        best_fitness: best.fitness(),
        best,
        seed_fitness,
        iterations: total_iterations,
        temperature_levels: step,
        final_temperature: temperature,
        accepted_moves,
        improving_moves,
        cancelled,
        fitness_history,
    })
}

/// Apply the cooling schedule to compute the next temperature.
fn cool(temperature: f64, config: &SaConfig, step: usize, linear_max_steps: usize) -> f64 {
    match config.cooling {
        CoolingSchedule::Geometric { alpha } => temperature * alpha,

        CoolingSchedule::Linear => {
            let t = config.initial_temperature
                - (step + 1) as f64 * (config.initial_temperature - config.min_temperature)
                    / linear_max_steps as f64;
            t.max(config.min_temperature)
        }

        CoolingSchedule::LundyMees { beta } => temperature / (1.0 + beta * temperature),
    }
}

/// Number of temperature levels for linear cooling.
fn compute_linear_steps(config: &SaConfig) -> usize {
    if config.max_iterations > 0 {
        (config.max_iterations / config.iterations_per_temperature).max(1)
    } else {
        100
    }
}
