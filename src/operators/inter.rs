//! Multi-route moves.
//!
//! Each move touches at most two routes of a solution, keeps every customer
//! on exactly one route, and returns a [`MoveUndo`] holding the touched
//! routes as they were before the move. Callers check the touched routes
//! and call [`MoveUndo::revert`] if any became infeasible.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::intra::{distinct_pair, swap_sequence};
use crate::instance::Instance;
use crate::models::Route;

/// Snapshot of the routes a move changed.
#[derive(Debug, Clone)]
pub struct MoveUndo {
    saved: Vec<(usize, Route)>,
}

impl MoveUndo {
    fn save(routes: &[Route], indices: &[usize]) -> Self {
        Self {
            saved: indices.iter().map(|&i| (i, routes[i].clone())).collect(),
        }
    }

    /// Indices of the touched routes.
    pub fn touched(&self) -> impl Iterator<Item = usize> + '_ {
        self.saved.iter().map(|(i, _)| *i)
    }

    /// Returns `true` if every touched route is feasible.
    pub fn all_feasible(&self, routes: &[Route]) -> bool {
        self.touched().all(|i| routes[i].is_feasible())
    }

    /// Restores every touched route.
    pub fn revert(self, routes: &mut [Route]) {
        for (i, route) in self.saved {
            routes[i] = route;
        }
    }
}

/// The multi-route move set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MultiRouteMove {
    /// Move one stop (or a pickup/delivery pair) to another route.
    Shift,
    /// Exchange one stop between two routes.
    Exchange,
    /// Reverse, rotate or shuffle a short segment of one route.
    Rearrange,
    /// 1 to 10 random swaps inside one route.
    SwapSequence,
}

impl MultiRouteMove {
    pub const ALL: [MultiRouteMove; 4] = [
        MultiRouteMove::Shift,
        MultiRouteMove::Exchange,
        MultiRouteMove::Rearrange,
        MultiRouteMove::SwapSequence,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Applies this move to `routes`. `None` when the move does not apply
    /// (e.g. fewer than two used routes for a shift).
    pub fn apply<R: Rng>(
        self,
        routes: &mut [Route],
        instance: &Instance,
        rng: &mut R,
    ) -> Option<MoveUndo> {
        match self {
            MultiRouteMove::Shift => pd_shift(routes, instance, rng),
            MultiRouteMove::Exchange => pd_exchange(routes, instance, rng),
            MultiRouteMove::Rearrange => pd_rearrange(routes, instance, rng),
            MultiRouteMove::SwapSequence => {
                let r = pick_used(routes, 2, rng)?;
                let undo = MoveUndo::save(routes, &[r]);
                routes[r].mutate_clamped(instance, |s| swap_sequence(s, rng));
                Some(undo)
            }
        }
    }
}

/// Moves a random stop of one used route to a random position of another.
///
/// A paired stop travels with its sibling: the pickup is inserted first and
/// the delivery somewhere after it.
pub fn pd_shift<R: Rng>(routes: &mut [Route], instance: &Instance, rng: &mut R) -> Option<MoveUndo> {
    let (src, dst) = pick_two_used(routes, rng)?;
    let undo = MoveUndo::save(routes, &[src, dst]);

    let pos = rng.random_range(0..routes[src].len());
    let stop = routes[src].stops()[pos];
    let sibling = instance
        .location(stop)
        .pair()
        .filter(|&sib| routes[src].contains(sib));

    let moved: Vec<usize> = match sibling {
        Some(sib) if instance.location(stop).is_pickup() => vec![stop, sib],
        Some(sib) => vec![sib, stop],
        None => vec![stop],
    };
    routes[src].mutate_clamped(instance, |s| s.retain(|x| !moved.contains(x)));

    let len = routes[dst].len();
    let first = rng.random_range(0..=len);
    let second = rng.random_range(first + 1..=len + 1);
    routes[dst].mutate_clamped(instance, |s| {
        s.insert(first, moved[0]);
        if let Some(&d) = moved.get(1) {
            s.insert(second, d);
        }
    });
    Some(undo)
}

/// Exchanges one random stop between two used routes.
pub fn pd_exchange<R: Rng>(
    routes: &mut [Route],
    instance: &Instance,
    rng: &mut R,
) -> Option<MoveUndo> {
    let (a, b) = pick_two_used(routes, rng)?;
    let undo = MoveUndo::save(routes, &[a, b]);

    let pa = rng.random_range(0..routes[a].len());
    let pb = rng.random_range(0..routes[b].len());
    let sa = routes[a].stops()[pa];
    let sb = routes[b].stops()[pb];
    routes[a].mutate_clamped(instance, |s| s[pa] = sb);
    routes[b].mutate_clamped(instance, |s| s[pb] = sa);
    Some(undo)
}

/// Rearranges a segment of 3 to 7 stops in one route of length 3 or more.
///
/// The segment is reversed, rotated or shuffled with equal probability.
pub fn pd_rearrange<R: Rng>(
    routes: &mut [Route],
    instance: &Instance,
    rng: &mut R,
) -> Option<MoveUndo> {
    let r = pick_used(routes, 3, rng)?;
    let undo = MoveUndo::save(routes, &[r]);

    let len = routes[r].len();
    let start = rng.random_range(0..len - 2);
    let end = start + 2 + rng.random_range(0..(len - start - 2).min(5));
    let method = rng.random_range(0..3);

    routes[r].mutate_clamped(instance, |s| {
        let seg = &mut s[start..=end];
        match method {
            0 => seg.reverse(),
            1 => {
                let by = rng.random_range(1..seg.len());
                seg.rotate_left(by);
            }
            _ => seg.shuffle(rng),
        }
    });
    Some(undo)
}

/// A random route with at least `min_len` stops.
fn pick_used<R: Rng>(routes: &[Route], min_len: usize, rng: &mut R) -> Option<usize> {
    let used: Vec<usize> = (0..routes.len())
        .filter(|&i| routes[i].len() >= min_len)
        .collect();
    used.choose(rng).copied()
}

/// Two distinct non-empty routes.
fn pick_two_used<R: Rng>(routes: &[Route], rng: &mut R) -> Option<(usize, usize)> {
    let used: Vec<usize> = (0..routes.len())
        .filter(|&i| !routes[i].is_empty())
        .collect();
    let (i, j) = distinct_pair(used.len(), rng)?;
    Some((used[i], used[j]))
}
