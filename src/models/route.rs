//! Vehicle route representation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::evaluation::is_insertion_feasible;
use crate::instance::Instance;
use crate::operators::clamp_indices;

/// An ordered sequence of stops served by one vehicle.
///
/// The depot is implicit at both ends and never stored. The cached distance
/// (depot legs included) and feasibility flag are recomputed every time the
/// sequence changes, so the only ways to change the stops are
/// [`set_stops`](Route::set_stops) and [`mutate`](Route::mutate). Both
/// reject stops outside `[1, num_locations)`.
///
/// Cloning a route deep-copies its stop sequence.
///
/// # Examples
///
/// ```
/// use u_routeswarm::instance::Instance;
/// use u_routeswarm::models::{Location, Route};
///
/// let instance = Instance::new(
///     vec![
///         Location::depot(0.0, 0.0),
///         Location::new(1, 3.0, 4.0).with_pickup(1.0, 0.0),
///     ],
///     10.0,
/// )
/// .unwrap();
/// let route = Route::new(vec![1], &instance).unwrap();
/// assert!((route.distance() - 10.0).abs() < 1e-10);
/// assert!(route.is_feasible());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    stops: Vec<usize>,
    capacity: f64,
    distance: f64,
    feasible: bool,
}

impl Route {
    /// Creates a route, rejecting stops outside `[1, num_locations)`.
    pub fn new(stops: Vec<usize>, instance: &Instance) -> Result<Self, RoutingError> {
        validate_indices(0, &stops, instance.num_locations())?;
        Ok(Self::from_valid(stops, instance))
    }

    /// An unused vehicle.
    pub fn empty(instance: &Instance) -> Self {
        Self::from_valid(Vec::new(), instance)
    }

    pub(crate) fn from_valid(stops: Vec<usize>, instance: &Instance) -> Self {
        let mut route = Self {
            stops,
            capacity: instance.capacity(),
            distance: 0.0,
            feasible: true,
        };
        route.refresh(instance);
        route
    }

    /// Stop indices in visiting order.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Vehicle capacity ceiling.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Total travel distance, depot legs included.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Whether the route satisfies every time window and capacity limit.
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    pub fn contains(&self, stop: usize) -> bool {
        self.stops.contains(&stop)
    }

    pub fn position_of(&self, stop: usize) -> Option<usize> {
        self.stops.iter().position(|&s| s == stop)
    }

    /// Replaces the stop sequence and recomputes the cache.
    ///
    /// Fails with [`RoutingError::IndexOutOfRange`] on the first stop
    /// outside `[1, num_locations)` and leaves the route unchanged.
    pub fn set_stops(
        &mut self,
        stops: Vec<usize>,
        instance: &Instance,
    ) -> Result<(), RoutingError> {
        validate_indices(0, &stops, instance.num_locations())?;
        self.stops = stops;
        self.refresh(instance);
        Ok(())
    }

    /// Edits the stop sequence in place, then validates and recomputes.
    ///
    /// When the edit leaves a stop outside `[1, num_locations)` the previous
    /// sequence is restored and the error returned.
    pub fn mutate<R>(
        &mut self,
        instance: &Instance,
        f: impl FnOnce(&mut Vec<usize>) -> R,
    ) -> Result<R, RoutingError> {
        let before = self.stops.clone();
        let out = f(&mut self.stops);
        if let Err(e) = validate_indices(0, &self.stops, instance.num_locations()) {
            self.stops = before;
            return Err(e);
        }
        self.refresh(instance);
        Ok(out)
    }

    /// Like [`set_stops`](Route::set_stops), but clamps out-of-range indices
    /// into `[1, num_locations)`.
    pub(crate) fn set_stops_clamped(&mut self, stops: Vec<usize>, instance: &Instance) {
        self.stops = stops;
        clamp_indices(&mut self.stops, instance.num_locations());
        self.refresh(instance);
    }

    /// Operator path: edits in place, clamps and recomputes.
    pub(crate) fn mutate_clamped<R>(
        &mut self,
        instance: &Instance,
        f: impl FnOnce(&mut Vec<usize>) -> R,
    ) -> R {
        let out = f(&mut self.stops);
        clamp_indices(&mut self.stops, instance.num_locations());
        self.refresh(instance);
        out
    }

    fn refresh(&mut self, instance: &Instance) {
        self.distance = instance.distances().tour_length(&self.stops);
        self.feasible = is_insertion_feasible(&self.stops, instance, self.capacity);
    }
}

/// Fails on the first stop outside `[1, num_locations)`.
pub(crate) fn validate_indices(
    route: usize,
    stops: &[usize],
    num_locations: usize,
) -> Result<(), RoutingError> {
    match stops
        .iter()
        .enumerate()
        .find(|(_, &s)| s == 0 || s >= num_locations)
    {
        Some((position, &index)) => Err(RoutingError::IndexOutOfRange {
            route,
            position,
            index,
            num_locations,
        }),
        None => Ok(()),
    }
}
