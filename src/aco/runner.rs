//! ACO execution loop.

use rand::rngs::StdRng;
use rand::Rng;

use super::config::AcoConfig;
use super::pheromone::PheromoneMatrix;
use crate::engine::moves::{
    best_seed, build_population, multi_route_move, restart_worst, update_agents, validate_seeds,
};
use crate::engine::{check_config, EngineKind, EngineResult, SearchContext};
use crate::error::RoutingError;
use crate::events::{EventKind, Phase};
use crate::evaluation::Evaluator;
use crate::models::{best_index, Agent, Solution};
use crate::operators::Operator;
use crate::random::rng_from;

const KIND: EngineKind = EngineKind::AntColony;

/// Executes the Ant Colony engine.
pub struct AcoRunner;

impl AcoRunner {
    /// Runs the colony from `seeds` and returns the best ant.
    pub fn run(
        ctx: &SearchContext<'_>,
        seeds: &[Solution],
        config: &AcoConfig,
    ) -> Result<EngineResult, RoutingError> {
        check_config(KIND, config.validate())?;
        let instance = ctx.instance();
        validate_seeds(seeds, instance)?;
        let mut rng = rng_from(config.seed);

        ctx.emit(KIND, EventKind::Phase { phase: Phase::Init });
        let seed_fitness = best_seed(ctx, seeds).map_or(f64::INFINITY, |s| s.fitness());
        let mut colony = build_population(
            KIND,
            ctx,
            seeds,
            config.colony_size,
            config.diversify_steps,
            &mut rng,
        );
        let mut best = colony
            .first()
            .map(|a| a.solution().clone())
            .ok_or(RoutingError::NoVehicles)?;
        let mut pheromone = PheromoneMatrix::new(
            instance,
            config.initial_pheromone,
            config.min_pheromone,
            config.max_pheromone,
        );
        let mut fitness_history = vec![best.fitness()];
        let mut iterations = 0;
        let mut cancelled = false;

        ctx.emit(KIND, EventKind::Phase { phase: Phase::Search });
        for iteration in 0..config.max_iterations {
            if ctx.should_stop() {
                cancelled = true;
                break;
            }

            let base_seed: u64 = rng.random();
            let evaluator = *ctx.evaluator();
            let trails = &pheromone;
            update_agents(&mut colony, base_seed, config.parallel, |_, ant, ant_rng| {
                move_ant(ant, &evaluator, trails, config, ant_rng);
            });

            if let Some(i) = best_index(&colony) {
                if colony[i].fitness() < best.fitness() {
                    best = colony[i].solution().clone();
                    ctx.emit(
                        KIND,
                        EventKind::NewBest {
                            iteration,
                            fitness: best.fitness(),
                        },
                    );
                }
            }

            pheromone.evaporate(config.evaporation);
            if best.fitness() > 0.0 && best.fitness().is_finite() {
                pheromone.deposit(&best, config.q / best.fitness());
            }

            if config.diversify_interval > 0 && iteration % config.diversify_interval == 0 {
                ctx.emit(KIND, EventKind::Phase { phase: Phase::Diversify });
                restart_worst(
                    &mut colony,
                    config.keep_fraction,
                    config.diversify_steps,
                    ctx,
                    &mut rng,
                    |_| best.clone(),
                );
            }

            iterations += 1;
            fitness_history.push(best.fitness());
            ctx.progress(KIND, iteration, best.fitness());
        }

        Ok(EngineResult {
            kind: KIND,
            best_fitness: best.fitness(),
            best,
            seed_fitness,
            iterations,
            cancelled,
            fitness_history,
        })
    }
}

/// One ant step: every route is either rebuilt from the trails or hit with
/// a random operator, reverting routes that became infeasible, then an
/// optional multi-route move. The ant moves only if the result is better.
fn move_ant(
    ant: &mut Agent,
    evaluator: &Evaluator<'_>,
    pheromone: &PheromoneMatrix,
    config: &AcoConfig,
    rng: &mut StdRng,
) {
    let instance = evaluator.instance();
    let mut candidate = ant.solution().clone();

    for r in 0..candidate.num_routes() {
        if candidate.route(r).len() < 2 {
            continue;
        }
        let before = candidate.route(r).clone();
        let route = candidate.route_mut(r);
        if rng.random_bool(config.rebuild_probability) {
            route.mutate_clamped(instance, |stops| {
                *stops = pheromone.construct(stops, config.alpha, config.beta, rng);
            });
        } else {
            route.mutate_clamped(instance, |stops| {
                Operator::apply_random(stops, rng);
            });
        }
        if !route.is_feasible() {
            *route = before;
        }
    }

    if candidate.active_routes() >= 2 && rng.random_bool(config.multi_route_probability) {
        multi_route_move(&mut candidate, instance, rng);
    }

    evaluator.evaluate(&mut candidate);
    ant.accept_if_better(candidate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{line_instance, line_seed};
    use crate::evaluation::FitnessWeights;
    use crate::events::CollectingSink;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn quick() -> AcoConfig {
        AcoConfig::default()
            .with_colony_size(8)
            .with_max_iterations(15)
            .with_seed(42)
    }

    #[test]
    fn test_aco_never_worse_than_seed() {
        let inst = line_instance(14, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let seed = line_seed(&inst, 4);
        let result = AcoRunner::run(&ctx, &[seed], &quick()).expect("run");
        assert_eq!(result.kind, EngineKind::AntColony);
        assert!(result.best_fitness <= result.seed_fitness);
        assert!(result.best.covers_all(inst.num_locations()));
        assert!(result.best.is_feasible());
        assert_eq!(result.iterations, 15);
        assert_eq!(result.fitness_history.len(), 16);
        assert!(result.fitness_history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_aco_deterministic_across_modes() {
        let inst = line_instance(10, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let seed = line_seed(&inst, 3);
        let seq = AcoRunner::run(&ctx, &[seed.clone()], &quick().with_parallel(false)).expect("run");
        let par = AcoRunner::run(&ctx, &[seed], &quick().with_parallel(true)).expect("run");
        assert_eq!(seq.fitness_history, par.fitness_history);
        assert_eq!(seq.best.index_sequences(), par.best.index_sequences());
    }

    #[test]
    fn test_aco_diversify_events() {
        let inst = line_instance(8, 20.0);
        let sink = CollectingSink::new();
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()))
            .with_sink(&sink);
        let config = quick().with_max_iterations(21);
        AcoRunner::run(&ctx, &[line_seed(&inst, 2)], &config).expect("run");
        let diversified = sink
            .events()
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Phase { phase: Phase::Diversify }))
            .count();
        // iterations 0, 10 and 20
        assert_eq!(diversified, 3);
    }

    #[test]
    fn test_aco_cancel_returns_seed() {
        let inst = line_instance(8, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()))
            .with_cancel(Arc::new(AtomicBool::new(true)));
        let result = AcoRunner::run(&ctx, &[line_seed(&inst, 2)], &quick()).expect("run");
        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert!(result.best_fitness <= result.seed_fitness);
    }

    #[test]
    fn test_aco_rejects_invalid_config() {
        let inst = line_instance(4, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let err = AcoRunner::run(&ctx, &[line_seed(&inst, 1)], &quick().with_colony_size(0))
            .unwrap_err();
        assert!(matches!(
            err,
            RoutingError::InvalidConfig {
                engine: EngineKind::AntColony,
                ..
            }
        ));
    }

    #[test]
    fn test_aco_rejects_nan_pheromone_bound() {
        let inst = line_instance(4, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let config = quick().with_pheromone_bounds(1.0, 0.1, f64::NAN);
        let err = AcoRunner::run(&ctx, &[line_seed(&inst, 1)], &config).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidConfig { .. }));
    }
}
