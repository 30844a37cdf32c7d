//! WOA execution loop.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::Rng;

use super::config::WoaConfig;
use crate::engine::moves::{
    best_seed, build_population, multi_route_move, update_agents, validate_seeds,
};
use crate::engine::position::{settle, OutOfRange};
use crate::engine::{check_config, EngineKind, EngineResult, SearchContext};
use crate::error::RoutingError;
use crate::events::{EventKind, Phase};
use crate::evaluation::Evaluator;
use crate::models::{best_index, Agent, Solution};
use crate::operators::Operator;
use crate::random::rng_from;

const KIND: EngineKind = EngineKind::Whale;

/// Executes the Whale engine.
pub struct WoaRunner;

impl WoaRunner {
    /// Runs the pod from `seeds` and returns the best whale.
    pub fn run(
        ctx: &SearchContext<'_>,
        seeds: &[Solution],
        config: &WoaConfig,
    ) -> Result<EngineResult, RoutingError> {
        check_config(KIND, config.validate())?;
        let instance = ctx.instance();
        validate_seeds(seeds, instance)?;
        let mut rng = rng_from(config.seed);

        ctx.emit(KIND, EventKind::Phase { phase: Phase::Init });
        let seed_fitness = best_seed(ctx, seeds).map_or(f64::INFINITY, |s| s.fitness());
        let mut pod = build_population(
            KIND,
            ctx,
            seeds,
            config.population_size,
            config.diversify_steps,
            &mut rng,
        );
        let mut best = pod
            .first()
            .map(|a| a.solution().clone())
            .ok_or(RoutingError::NoVehicles)?;
        let mut fitness_history = vec![best.fitness()];
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
            let prey = &best;
            update_agents(&mut pod, base_seed, config.parallel, |_, whale, whale_rng| {
                swim(whale, prey, a, &evaluator, config, whale_rng);
            });

            if let Some(i) = best_index(&pod) {
                if pod[i].fitness() < best.fitness() {
                    best = pod[i].solution().clone();
                    ctx.emit(
                        KIND,
                        EventKind::NewBest {
                            iteration,
                            fitness: best.fitness(),
                        },
                    );
                }
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

/// Moves one whale, route by route.
///
/// With probability `1 - spiral_probability` the route either encircles the
/// best whale's route (`|A| < 1`) or explores with a random operator or a
/// multi-route move; otherwise it follows the logarithmic spiral around the
/// best route. Infeasible routes are reverted. The whale moves only if the
/// result is better.
fn swim(
    whale: &mut Agent,
    prey: &Solution,
    a: f64,
    evaluator: &Evaluator<'_>,
    config: &WoaConfig,
    rng: &mut StdRng,
) {
    let instance = evaluator.instance();
    let n = instance.num_locations();
    let mut candidate = whale.solution().clone();

    for i in 0..candidate.num_routes() {
        if candidate.route(i).is_empty() {
            continue;
        }
        let target = prey.routes().get(i).map_or(&[][..], |r| r.stops());
        let big_a = 2.0 * a * rng.random::<f64>() - a;
        let c = 2.0 * rng.random::<f64>();

        let positions = if rng.random_bool(config.spiral_probability) {
            spiral(candidate.route(i).stops(), target, config.spiral_b, rng)
        } else if big_a.abs() < 1.0 {
            encircle(candidate.route(i).stops(), target, big_a, c)
        } else {
            if candidate.active_routes() >= 2 && rng.random_bool(config.multi_route_probability)
            {
                multi_route_move(&mut candidate, instance, rng);
            } else {
                let before = candidate.route(i).clone();
                let route = candidate.route_mut(i);
                route.mutate_clamped(instance, |stops| {
                    Operator::apply_random(stops, rng);
                });
                if !route.is_feasible() {
                    *route = before;
                }
            }
            continue;
        };

        let before = candidate.route(i).clone();
        let moved = settle(before.stops(), &positions, n, OutOfRange::Keep);
        let route = candidate.route_mut(i);
        route.set_stops_clamped(moved, instance);
        if !route.is_feasible() {
            *route = before;
        }
    }

    evaluator.evaluate(&mut candidate);
    whale.accept_if_better(candidate);
}

/// `L[k] - A * |C * L[k] - X[k]|` over the common prefix.
fn encircle(current: &[usize], leader: &[usize], big_a: f64, c: f64) -> Vec<f64> {
    current
        .iter()
        .zip(leader)
        .map(|(&x, &l)| {
            let l = l as f64;
            l - big_a * (c * l - x as f64).abs()
        })
        .collect()
}

/// `|L[k] - X[k]| * e^(b*l) * cos(2*pi*l) + L[k]` with a fresh
/// `l` in `[-1, 1)` per position.
fn spiral<R: Rng>(current: &[usize], leader: &[usize], b: f64, rng: &mut R) -> Vec<f64> {
    current
        .iter()
        .zip(leader)
        .map(|(&x, &l)| {
            let t: f64 = rng.random_range(-1.0..1.0);
            let l = l as f64;
            (l - x as f64).abs() * (b * t).exp() * (2.0 * PI * t).cos() + l
        })
        .collect()
}
