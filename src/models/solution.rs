//! Complete solutions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::route::{validate_indices, Route};
use crate::error::RoutingError;
use crate::instance::Instance;

/// One route per vehicle slot covering every customer exactly once.
///
/// The fitness is cached by [`Evaluator::evaluate`](crate::evaluation::Evaluator::evaluate);
/// it is `f64::INFINITY` until the solution has been evaluated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    routes: Vec<Route>,
    fitness: f64,
}

impl Solution {
    /// Builds a solution from per-vehicle stop sequences.
    ///
    /// Each sequence is one vehicle slot; empty sequences are unused
    /// vehicles.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::NoVehicles`] if `sequences` is empty.
    /// - [`RoutingError::IndexOutOfRange`] on the first stop outside
    ///   `[1, num_locations)`. Bad indices are never clamped here.
    /// - [`RoutingError::CoverageViolation`] if some customer is missing or
    ///   visited twice.
    pub fn from_index_sequences(
        sequences: &[Vec<usize>],
        instance: &Instance,
    ) -> Result<Self, RoutingError> {
        if sequences.is_empty() {
            return Err(RoutingError::NoVehicles);
        }
        for (r, seq) in sequences.iter().enumerate() {
            validate_indices(r, seq, instance.num_locations())?;
        }
        let solution = Self::from_valid_routes(
            sequences
                .iter()
                .map(|seq| Route::from_valid(seq.clone(), instance))
                .collect(),
        );
        solution.check_coverage(instance.num_locations())?;
        Ok(solution)
    }

    /// Builds a solution from already constructed routes.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::NoVehicles`] if `routes` is empty.
    /// - [`RoutingError::CoverageViolation`] if some customer is missing,
    ///   visited twice, or outside `[1, num_locations)`.
    pub fn from_routes(routes: Vec<Route>, instance: &Instance) -> Result<Self, RoutingError> {
        if routes.is_empty() {
            return Err(RoutingError::NoVehicles);
        }
        let solution = Self::from_valid_routes(routes);
        solution.check_coverage(instance.num_locations())?;
        Ok(solution)
    }

    /// Wraps routes whose coverage the caller guarantees.
    pub(crate) fn from_valid_routes(routes: Vec<Route>) -> Self {
        Self {
            routes,
            fitness: f64::INFINITY,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut [Route] {
        &mut self.routes
    }

    pub fn route(&self, index: usize) -> &Route {
        &self.routes[index]
    }

    pub fn route_mut(&mut self, index: usize) -> &mut Route {
        &mut self.routes[index]
    }

    /// Number of vehicle slots.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of vehicles actually used.
    pub fn active_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Cached fitness (lower is better).
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(Route::distance).sum()
    }

    /// Returns `true` if every route is feasible.
    pub fn is_feasible(&self) -> bool {
        self.routes.iter().all(Route::is_feasible)
    }

    /// Stop sequences of every vehicle slot.
    pub fn index_sequences(&self) -> Vec<Vec<usize>> {
        self.routes.iter().map(|r| r.stops().to_vec()).collect()
    }

    /// Verifies that customers `1..num_locations` each appear exactly once.
    pub fn check_coverage(&self, num_locations: usize) -> Result<(), RoutingError> {
        let mut seen = vec![0usize; num_locations.max(1)];
        let mut out_of_range = Vec::new();
        for route in &self.routes {
            for &s in route.stops() {
                match seen.get_mut(s) {
                    Some(count) if s > 0 => *count += 1,
                    _ => out_of_range.push(s),
                }
            }
        }
        let missing: Vec<usize> = (1..num_locations).filter(|&i| seen[i] == 0).collect();
        let mut duplicated: Vec<usize> = (1..num_locations).filter(|&i| seen[i] > 1).collect();
        duplicated.extend(out_of_range);
        if missing.is_empty() && duplicated.is_empty() {
            Ok(())
        } else {
            Err(RoutingError::CoverageViolation {
                missing,
                duplicated,
            })
        }
    }

    /// Returns `true` if [`check_coverage`](Self::check_coverage) passes.
    pub fn covers_all(&self, num_locations: usize) -> bool {
        self.check_coverage(num_locations).is_ok()
    }
}
