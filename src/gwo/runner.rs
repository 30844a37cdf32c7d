//! GWO execution loop.

use rand::rngs::StdRng;
use rand::Rng;

use super::config::GwoConfig;
use crate::engine::moves::{
    best_seed, build_population, multi_route_move, restart_worst, update_agents, validate_seeds,
};
use crate::engine::position::{mean_gap, mean_position, settle, step_toward, OutOfRange};
use crate::engine::{check_config, EngineKind, EngineResult, SearchContext};
use crate::error::RoutingError;
use crate::events::{EventKind, Phase};
use crate::evaluation::Evaluator;
use crate::models::{Agent, Solution};
use crate::operators::Operator;
use crate::random::rng_from;

const KIND: EngineKind = EngineKind::GreyWolf;

/// The three best distinct solutions seen so far: alpha, beta, delta.
///
/// With fewer than three distinct solutions the lower ranks repeat the
/// one above them.
#[derive(Debug, Clone)]
struct Hierarchy {
    leaders: [Solution; 3],
}

impl Hierarchy {
    fn from_candidates<'s>(candidates: impl Iterator<Item = &'s Solution>) -> Option<Self> {
        let mut sorted: Vec<&Solution> = candidates.collect();
        sorted.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));

        let mut picked: Vec<&Solution> = Vec::with_capacity(3);
        for s in sorted {
            if picked.len() == 3 {
                break;
            }
            if !picked.iter().any(|p| p.routes() == s.routes()) {
                picked.push(s);
            }
        }
        let alpha = (*picked.first()?).clone();
        let beta = picked.get(1).map_or_else(|| alpha.clone(), |s| (*s).clone());
        let delta = picked.get(2).map_or_else(|| beta.clone(), |s| (*s).clone());
        Some(Self {
            leaders: [alpha, beta, delta],
        })
    }

    /// Re-ranks the leaders against the pack.
    fn update(&mut self, pack: &[Agent]) {
        let candidates = self
            .leaders
            .iter()
            .chain(pack.iter().map(Agent::solution));
        if let Some(h) = Self::from_candidates(candidates) {
            *self = h;
        }
    }

    fn alpha(&self) -> &Solution {
        &self.leaders[0]
    }

    /// Draws a leader with the given relative odds.
    fn pick<R: Rng>(&self, weights: &[f64; 3], rng: &mut R) -> &Solution {
        let total: f64 = weights.iter().sum();
        let mut target = rng.random::<f64>() * total;
        for (leader, &w) in self.leaders.iter().zip(weights) {
            if target < w {
                return leader;
            }
            target -= w;
        }
        &self.leaders[2]
    }
}

/// Executes the Grey Wolf engine.
pub struct GwoRunner;

impl GwoRunner {
    /// Runs the pack from `seeds` and returns the alpha wolf.
    pub fn run(
        ctx: &SearchContext<'_>,
        seeds: &[Solution],
        config: &GwoConfig,
    ) -> Result<EngineResult, RoutingError> {
        check_config(KIND, config.validate())?;
        let instance = ctx.instance();
        validate_seeds(seeds, instance)?;
        let mut rng = rng_from(config.seed);

        ctx.emit(KIND, EventKind::Phase { phase: Phase::Init });
        let seed_fitness = best_seed(ctx, seeds).map_or(f64::INFINITY, |s| s.fitness());
        let mut pack = build_population(
            KIND,
            ctx,
            seeds,
            config.population_size,
            config.diversify_steps,
            &mut rng,
        );
        let mut hierarchy = Hierarchy::from_candidates(pack.iter().map(Agent::solution))
            .ok_or(RoutingError::NoVehicles)?;
        let mut fitness_history = vec![hierarchy.alpha().fitness()];
        let mut iterations = 0;
        let mut cancelled = false;

        ctx.emit(KIND, EventKind::Phase { phase: Phase::Search });
        for iteration in 0..config.max_iterations {
            if ctx.should_stop() {
                cancelled = true;
                break;
            }

            let a = config.a_max * (1.0 - iteration as f64 / config.max_iterations as f64);
            let base_seed: u64 = rng.random();
            let evaluator = *ctx.evaluator();
            let leaders = &hierarchy;
            update_agents(&mut pack, base_seed, config.parallel, |_, wolf, wolf_rng| {
                hunt(wolf, leaders, a, &evaluator, config, wolf_rng);
            });

            let previous = hierarchy.alpha().fitness();
            hierarchy.update(&pack);

            if config.diversify_interval > 0 && iteration % config.diversify_interval == 0 {
                ctx.emit(KIND, EventKind::Phase { phase: Phase::Diversify });
                let leaders = &hierarchy;
                restart_worst(
                    &mut pack,
                    config.keep_fraction,
                    config.diversify_steps,
                    ctx,
                    &mut rng,
                    |r| leaders.pick(&config.leader_weights, r).clone(),
                );
                hierarchy.update(&pack);
            }

            if hierarchy.alpha().fitness() < previous {
                ctx.emit(
                    KIND,
                    EventKind::NewBest {
                        iteration,
                        fitness: hierarchy.alpha().fitness(),
                    },
                );
            }

            iterations += 1;
            fitness_history.push(hierarchy.alpha().fitness());
            ctx.progress(KIND, iteration, hierarchy.alpha().fitness());
        }

        let best = hierarchy.alpha().clone();
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

/// Moves one wolf toward the three leaders, route by route.
///
/// For route `i`, each leader `L` proposes `L[k] - A * D` with
/// `D = mean_k |C * L[k] - X[k]|`, `A = 2a*r - a` and `C = 2r`; the route
/// takes the rounded mean of the three proposals. Infeasible routes are
/// reverted. The wolf moves only if the result is better.
fn hunt(
    wolf: &mut Agent,
    hierarchy: &Hierarchy,
    a: f64,
    evaluator: &Evaluator<'_>,
    config: &GwoConfig,
    rng: &mut StdRng,
) {
    let instance = evaluator.instance();
    let n = instance.num_locations();
    let mut candidate = wolf.solution().clone();

    for i in 0..candidate.num_routes() {
        if candidate.route(i).is_empty() {
            continue;
        }
        let before = candidate.route(i).clone();
        let current = before.stops();

        let proposals: Vec<Vec<f64>> = hierarchy
            .leaders
            .iter()
            .map(|leader| {
                let target = leader.routes().get(i).map_or(&[][..], |r| r.stops());
                let big_a = 2.0 * a * rng.random::<f64>() - a;
                let c = 2.0 * rng.random::<f64>();
                let d = mean_gap(current, target, c);
                step_toward(target, big_a, d)
            })
            .collect();
        let moved = settle(current, &mean_position(&proposals), n, OutOfRange::Clamp);

        let route = candidate.route_mut(i);
        route.mutate_clamped(instance, |stops| {
            *stops = moved;
            if rng.random_bool(config.random_op_probability) {
                Operator::apply_random(stops, rng);
            }
        });
        if !route.is_feasible() {
            *route = before;
        }
    }

    if candidate.active_routes() >= 2 && rng.random_bool(config.multi_route_probability) {
        multi_route_move(&mut candidate, instance, rng);
    }

    evaluator.evaluate(&mut candidate);
    wolf.accept_if_better(candidate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{line_instance, line_seed};
    use crate::evaluation::FitnessWeights;
    use crate::random::create_rng;

    fn quick() -> GwoConfig {
        GwoConfig::default()
            .with_population_size(10)
            .with_max_iterations(12)
            .with_seed(42)
    }

    fn evaluated(inst: &crate::instance::Instance, vehicles: usize) -> Solution {
        let mut s = line_seed(inst, vehicles);
        Evaluator::new(inst, FitnessWeights::default()).evaluate(&mut s);
        s
    }

    #[test]
    fn test_hierarchy_orders_and_dedupes() {
        let inst = line_instance(9, 30.0);
        let one = evaluated(&inst, 1);
        let three = evaluated(&inst, 3);
        let h = Hierarchy::from_candidates([&three, &one, &three].into_iter()).expect("leaders");
        let (lo, hi) = if one.fitness() <= three.fitness() {
            (&one, &three)
        } else {
            (&three, &one)
        };
        assert_eq!(h.alpha().routes(), lo.routes());
        assert_eq!(h.leaders[1].routes(), hi.routes());
        // only two distinct candidates
        assert_eq!(h.leaders[2].routes(), hi.routes());
        assert!(Hierarchy::from_candidates(std::iter::empty()).is_none());
    }

    #[test]
    fn test_hierarchy_pick_respects_weights() {
        let inst = line_instance(9, 30.0);
        let one = evaluated(&inst, 1);
        let three = evaluated(&inst, 3);
        let h = Hierarchy::from_candidates([&one, &three].into_iter()).expect("leaders");
        let mut rng = create_rng(42);
        for _ in 0..20 {
            assert_eq!(h.pick(&[1.0, 0.0, 0.0], &mut rng).routes(), h.alpha().routes());
        }
    }

    #[test]
    fn test_gwo_never_worse_than_seed() {
        let inst = line_instance(14, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let result = GwoRunner::run(&ctx, &[line_seed(&inst, 4)], &quick()).expect("run");
        assert_eq!(result.kind, EngineKind::GreyWolf);
        assert!(result.best_fitness <= result.seed_fitness);
        assert!(result.best.covers_all(inst.num_locations()));
        assert!(result.best.is_feasible());
        assert_eq!(result.iterations, 12);
        assert!(result.fitness_history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_gwo_deterministic_across_modes() {
        let inst = line_instance(10, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let seed = line_seed(&inst, 3);
        let seq = GwoRunner::run(&ctx, &[seed.clone()], &quick().with_parallel(false)).expect("run");
        let par = GwoRunner::run(&ctx, &[seed], &quick().with_parallel(true)).expect("run");
        assert_eq!(seq.fitness_history, par.fitness_history);
        assert_eq!(seq.best.index_sequences(), par.best.index_sequences());
    }

    #[test]
    fn test_gwo_with_uneven_seeds() {
        let inst = line_instance(10, 20.0);
        let ctx = SearchContext::new(Evaluator::new(&inst, FitnessWeights::default()));
        let seeds = vec![line_seed(&inst, 2), line_seed(&inst, 5)];
        let result = GwoRunner::run(&ctx, &seeds, &quick()).expect("run");
        assert!(result.best.covers_all(inst.num_locations()));
        assert!(result.best_fitness <= result.seed_fitness);
    }
}
