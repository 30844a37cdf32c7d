//! SHO execution loop.

use rand::rngs::StdRng;
use rand::Rng;

use super::config::ShoConfig;
use super::greedy::greedy_reassign;
use crate::engine::moves::{
    best_seed, build_population, multi_route_move, update_agents, validate_seeds,
};
use crate::engine::{check_config, EngineKind, EngineResult, SearchContext};
use crate::error::RoutingError;
use crate::events::{EventKind, Phase};
use crate::evaluation::Evaluator;
use crate::models::{best_index, Agent, Solution};
use crate::operators::Operator;
use crate::random::rng_from;

const KIND: EngineKind = EngineKind::SpottedHyena;

/// Executes the Spotted Hyena engine.
pub struct ShoRunner;

impl ShoRunner {
    /// Runs the clan from `seeds`, then the greedy post-pass on the prey.
    pub fn run(
        ctx: &SearchContext<'_>,
        seeds: &[Solution],
        config: &ShoConfig,
    ) -> Result<EngineResult, RoutingError> {
        check_config(KIND, config.validate())?;
        let instance = ctx.instance();
        validate_seeds(seeds, instance)?;
        let mut rng = rng_from(config.seed);

        ctx.emit(KIND, EventKind::Phase { phase: Phase::Init });
        let seed_fitness = best_seed(ctx, seeds).map_or(f64::INFINITY, |s| s.fitness());
        let mut clan = build_population(
            KIND,
            ctx,
            seeds,
            config.population_size,
            config.diversify_steps,
            &mut rng,
        );
        let mut prey = clan
            .first()
            .map(|a| a.solution().clone())
            .ok_or(RoutingError::NoVehicles)?;
        let mut fitness_history = vec![prey.fitness()];
        let mut iterations = 0;
        let mut cancelled = false;

        ctx.emit(KIND, EventKind::Phase { phase: Phase::Search });
        for iteration in 0..config.max_iterations {
            if ctx.should_stop() {
                cancelled = true;
                break;
            }

            let a = config.h_max * (1.0 - iteration as f64 / config.max_iterations as f64);
            let base_seed: u64 = rng.random();
            let evaluator = *ctx.evaluator();
            let target = &prey;
            update_agents(&mut clan, base_seed, config.parallel, |_, hyena, hyena_rng| {
                chase(hyena, target, a, &evaluator, config, hyena_rng);
            });

            if let Some(i) = best_index(&clan) {
                if clan[i].fitness() < prey.fitness() {
                    prey = clan[i].solution().clone();
                    ctx.emit(
                        KIND,
                        EventKind::NewBest {
                            iteration,
                            fitness: prey.fitness(),
                        },
                    );
                }
            }

            iterations += 1;
            fitness_history.push(prey.fitness());
            ctx.progress(KIND, iteration, prey.fitness());
        }

        if config.post_process {
            ctx.emit(KIND, EventKind::Phase { phase: Phase::PostProcess });
            if let Some(mut greedy) = greedy_reassign(&prey, instance) {
                let fitness = ctx.evaluator().evaluate(&mut greedy);
                if greedy.is_feasible()
                    && greedy.covers_all(instance.num_locations())
                    && fitness <= prey.fitness()
                {
                    if fitness < prey.fitness() {
                        ctx.emit(
                            KIND,
                            EventKind::NewBest {
                                iteration: iterations,
                                fitness,
                            },
                        );
                    }
                    prey = greedy;
                    if let Some(last) = fitness_history.last_mut() {
                        *last = prey.fitness();
                    }
                }
            }
        }

        Ok(EngineResult {
            kind: KIND,
            best_fitness: prey.fitness(),
            best: prey,
            seed_fitness,
            iterations,
            cancelled,
            fitness_history,
        })
    }
}

/// Moves one hyena, route by route.
///
/// Per route, `B = 2(1 - r)`. When `B > 1` the route explores with a
/// multi-route move or a random operator. Otherwise, when `|E| < 1` with
/// `E = h(2r - 1)`, the route learns from the prey's route of the same
/// vehicle slot. Infeasible routes are reverted. The hyena moves only if
/// the result is better.
fn chase(
    hyena: &mut Agent,
    prey: &Solution,
    a: f64,
    evaluator: &Evaluator<'_>,
    config: &ShoConfig,
    rng: &mut StdRng,
) {
    let instance = evaluator.instance();
    let mut candidate = hyena.solution().clone();
    let h = 2.0 * a * rng.random::<f64>() - a;

    for i in 0..candidate.num_routes() {
        if candidate.route(i).len() < 2 {
            continue;
        }
        let b = 2.0 * (1.0 - rng.random::<f64>());
        let e = h * (2.0 * rng.random::<f64>() - 1.0);

        if b > 1.0 {
            if candidate.active_routes() >= 2 && rng.random_bool(config.multi_route_probability)
            {
                multi_route_move(&mut candidate, instance, rng);
                continue;
            }
            let before = candidate.route(i).clone();
            let route = candidate.route_mut(i);
            route.mutate_clamped(instance, |stops| {
                Operator::apply_random(stops, rng);
            });
            if !route.is_feasible() {
                *route = before;
            }
        } else if e.abs() < 1.0 {
            let Some(target) = prey.routes().get(i) else {
                continue;
            };
            let d = route_distance(
                candidate.route(i).stops(),
                target.stops(),
                config.structural_weight,
            );
            let before = candidate.route(i).clone();
            let route = candidate.route_mut(i);
            route.mutate_clamped(instance, |stops| {
                learn_from(stops, target.stops(), d, e, rng);
            });
            if !route.is_feasible() {
                *route = before;
            }
        }
    }

    evaluator.evaluate(&mut candidate);
    hyena.accept_if_better(candidate);
}

/// Distance in `[0, 1]` between two routes.
///
/// `w * structural + (1 - w) * order`, where structural is the share of
/// stops of the longer route missing from the other, and order is the
/// share of mismatched positions over the common prefix.
pub(crate) fn route_distance(a: &[usize], b: &[usize], structural_weight: f64) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    let common = a.iter().filter(|&s| b.contains(s)).count();
    let structural = (longest - common) as f64 / longest as f64;

    let shortest = a.len().min(b.len());
    let order = if shortest == 0 {
        1.0
    } else {
        let same = a.iter().zip(b).filter(|(x, y)| x == y).count();
        1.0 - same as f64 / shortest as f64
    };

    structural_weight * structural + (1.0 - structural_weight) * order
}

/// Pulls stops of `target` toward their relative position in `best`.
///
/// Performs `clamp(round(|E * D| * len / 2), 1, len / 2)` swaps, each
/// moving one randomly drawn stop of `best` (if `target` has it) to the
/// same relative position in `target`.
pub(crate) fn learn_from<R: Rng>(target: &mut [usize], best: &[usize], d: f64, e: f64, rng: &mut R) {
    let len = target.len();
    if len <= 1 || best.len() <= 1 {
        return;
    }
    let intensity = (e * d).abs();
    let swaps = ((intensity * len as f64 / 2.0).round() as usize).clamp(1, len / 2);

    for _ in 0..swaps {
        let bi = rng.random_range(0..best.len());
        let Some(ti) = target.iter().position(|&s| s == best[bi]) else {
            continue;
        };
        let relative = bi as f64 / best.len() as f64;
        let ni = ((relative * (len - 1) as f64).round() as usize).min(len - 1);
        target.swap(ti, ni);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{line_instance, line_seed};
    use crate::evaluation::FitnessWeights;
    use crate::events::CollectingSink;
    use crate::random::create_rng;

    fn quick() -> ShoConfig {
        ShoConfig::default()
            .with_population_size(8)
            .with_max_iterations(30)
            .with_seed(42)
    }

    #[test]
    fn test_route_distance() {
        assert_eq!(route_distance(&[], &[], 0.6), 0.0);
        assert!(route_distance(&[1, 2, 3], &[1, 2, 3], 0.6).abs() < 1e-12);
        // disjoint: structural 1, order 1
        assert!((route_distance(&[1, 2], &[3, 4], 0.6) - 1.0).abs() < 1e-12);
        // same stops, no position matches: structural 0, order 1
        assert!((route_distance(&[1, 2], &[2, 1], 0.6) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_learn_from_keeps_permutation() {
        let mut rng = create_rng(42);
        let best = vec![1, 2, 3, 4, 5, 6];
        let mut target = vec![6, 5, 4, 3, 2, 1];
        for _ in 0..20 {
            learn_from(&mut target, &best, 1.0, 0.9, &mut rng);
        }
        let mut sorted = target.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, best);
    }

    #[test]
    fn test_learn_from_moves_toward_best() {
        let mut rng = create_rng(7);
        let best = vec![1, 2];
        let mut target = vec![2, 1];
        learn_from(&mut target, &best, 1.0, 1.0, &mut rng);
        assert_eq!(target, best);
    }

    #[test]
    fn test_sho_never_worse_than_seed() {
        let inst = line_instance(14, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let result = ShoRunner::run(&ctx, &[line_seed(&inst, 4)], &quick()).expect("run");
        assert_eq!(result.kind, EngineKind::SpottedHyena);
        assert!(result.best_fitness <= result.seed_fitness);
        assert!(result.best.covers_all(inst.num_locations()));
        assert!(result.best.is_feasible());
        assert_eq!(result.iterations, 30);
        assert!(result.fitness_history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_sho_post_process_phase() {
        let inst = line_instance(10, 20.0);
        let sink = CollectingSink::new();
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()))
            .with_sink(&sink);
        ShoRunner::run(&ctx, &[line_seed(&inst, 3)], &quick()).expect("run");
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::Phase { phase: Phase::PostProcess })));

        sink.drain();
        let off = quick().with_post_process(false);
        ShoRunner::run(&ctx, &[line_seed(&inst, 3)], &off).expect("run");
        assert!(!sink
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::Phase { phase: Phase::PostProcess })));
    }

    #[test]
    fn test_sho_deterministic_across_modes() {
        let inst = line_instance(10, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let seed = line_seed(&inst, 3);
        let seq = ShoRunner::run(&ctx, &[seed.clone()], &quick().with_parallel(false)).expect("run");
        let par = ShoRunner::run(&ctx, &[seed], &quick().with_parallel(true)).expect("run");
        assert_eq!(seq.fitness_history, par.fitness_history);
        assert_eq!(seq.best.index_sequences(), par.best.index_sequences());
    }
}
