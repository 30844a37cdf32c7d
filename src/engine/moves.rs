//! Perturbation and population helpers shared by the engines.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rayon::prelude::*;

use super::{EngineKind, SearchContext};
use crate::error::RoutingError;
use crate::instance::Instance;
use crate::models::{sort_by_fitness, Agent, Solution};
use crate::operators::{MultiRouteMove, Operator};
use crate::random::{create_rng, derive_seed};

// ============================================================================
// Feasibility-gated moves
// ============================================================================

/// Applies one random toolkit operator to a clone of one random route and
/// commits it only if the route stays feasible.
///
/// Returns `true` if the solution changed.
pub fn random_route_move<R: Rng>(solution: &mut Solution, instance: &Instance, rng: &mut R) -> bool {
    let candidates: Vec<usize> = (0..solution.num_routes())
        .filter(|&i| solution.route(i).len() >= 2)
        .collect();
    let Some(&r) = candidates.choose(rng) else {
        return false;
    };
    let mut route = solution.route(r).clone();
    route.mutate_clamped(instance, |s| {
        Operator::apply_random(s, rng);
    });
    if route.is_feasible() && route.stops() != solution.route(r).stops() {
        *solution.route_mut(r) = route;
        true
    } else {
        false
    }
}

/// Applies one random multi-route move, reverting every touched route if
/// any of them became infeasible.
///
/// Returns `true` if the move was kept.
pub fn multi_route_move<R: Rng>(solution: &mut Solution, instance: &Instance, rng: &mut R) -> bool {
    let mv = MultiRouteMove::random(rng);
    match mv.apply(solution.routes_mut(), instance, rng) {
        Some(undo) if undo.all_feasible(solution.routes()) => true,
        Some(undo) => {
            undo.revert(solution.routes_mut());
            false
        }
        None => false,
    }
}

/// Perturbs with a multi-route move with probability `p_multi` (when at
/// least two routes are used), otherwise with a single-route move.
pub fn perturb<R: Rng>(solution: &mut Solution, instance: &Instance, p_multi: f64, rng: &mut R) -> bool {
    if solution.active_routes() >= 2 && rng.random_bool(p_multi) {
        multi_route_move(solution, instance, rng)
    } else {
        random_route_move(solution, instance, rng)
    }
}

/// Applies `steps` feasibility-gated perturbations.
pub fn diversify<R: Rng>(solution: &mut Solution, instance: &Instance, steps: usize, rng: &mut R) {
    for _ in 0..steps {
        perturb(solution, instance, 0.5, rng);
    }
}

// ============================================================================
// Population management
// ============================================================================

/// Checks the seeds handed to an engine.
///
/// Fails on an empty seed list, a seed without vehicle slots, or a seed that
/// does not cover every customer exactly once.
pub fn validate_seeds(seeds: &[Solution], instance: &Instance) -> Result<(), RoutingError> {
    if seeds.is_empty() {
        return Err(RoutingError::NoVehicles);
    }
    for seed in seeds {
        if seed.num_routes() == 0 {
            return Err(RoutingError::NoVehicles);
        }
        seed.check_coverage(instance.num_locations())?;
    }
    Ok(())
}

/// Evaluated clone of the best seed. `None` if `seeds` is empty.
pub fn best_seed(ctx: &SearchContext<'_>, seeds: &[Solution]) -> Option<Solution> {
    seeds
        .iter()
        .map(|s| {
            let mut s = s.clone();
            ctx.evaluator().evaluate(&mut s);
            s
        })
        .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))
}

/// Builds a population of `size` agents, best first.
///
/// Takes the best seeds when there are enough; otherwise keeps every seed
/// and fills the remainder with diversified copies, cycling through the
/// seeds.
pub fn build_population<R: Rng>(
    kind: EngineKind,
    ctx: &SearchContext<'_>,
    seeds: &[Solution],
    size: usize,
    diversify_steps: usize,
    rng: &mut R,
) -> Vec<Agent> {
    if seeds.is_empty() {
        return Vec::new();
    }
    let instance = ctx.instance();
    let mut agents: Vec<Agent> = seeds
        .iter()
        .map(|s| {
            let mut s = s.clone();
            ctx.evaluator().evaluate(&mut s);
            Agent::new(kind, s)
        })
        .collect();
    sort_by_fitness(&mut agents);
    agents.truncate(size);

    let mut k = 0;
    while agents.len() < size {
        let mut s = seeds[k % seeds.len()].clone();
        diversify(&mut s, instance, diversify_steps, rng);
        ctx.evaluator().evaluate(&mut s);
        agents.push(Agent::new(kind, s));
        k += 1;
    }
    sort_by_fitness(&mut agents);
    agents
}

/// Sorts the population, keeps the best `keep_fraction`, and replaces every
/// other agent with a diversified copy of the solution `source` returns.
pub fn restart_worst<R, F>(
    agents: &mut [Agent],
    keep_fraction: f64,
    steps: usize,
    ctx: &SearchContext<'_>,
    rng: &mut R,
    mut source: F,
) where
    R: Rng,
    F: FnMut(&mut R) -> Solution,
{
    sort_by_fitness(agents);
    let keep = (agents.len() as f64 * keep_fraction) as usize;
    for agent in agents.iter_mut().skip(keep) {
        let mut s = source(rng);
        diversify(&mut s, ctx.instance(), steps, rng);
        ctx.evaluator().evaluate(&mut s);
        agent.replace(s);
    }
}

/// Runs `update` on every agent, each with a private RNG derived from
/// `base_seed` and the agent's position.
///
/// With `parallel` the agents are updated on the rayon pool; the outcome is
/// identical either way.
pub fn update_agents<F>(agents: &mut [Agent], base_seed: u64, parallel: bool, update: F)
where
    F: Fn(usize, &mut Agent, &mut StdRng) + Send + Sync,
{
    if parallel {
        agents.par_iter_mut().enumerate().for_each(|(i, agent)| {
            let mut rng = create_rng(derive_seed(base_seed, i as u64));
            update(i, agent, &mut rng);
        });
    } else {
        for (i, agent) in agents.iter_mut().enumerate() {
            let mut rng = create_rng(derive_seed(base_seed, i as u64));
            update(i, agent, &mut rng);
        }
    }
}
