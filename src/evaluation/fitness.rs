//! Penalized fitness.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::feasibility::departure_load;
use crate::instance::Instance;
use crate::models::{Route, Solution};

/// Minimum penalty charged for any single violation.
pub const MIN_PENALTY: f64 = 100.0;

/// Penalty multiplier applied to the violation amount.
pub const PENALTY_FACTOR: f64 = 10.0;

/// Penalty for one violation of size `amount`: `max(100, 10 × amount)`.
pub fn violation_penalty(amount: f64) -> f64 {
    MIN_PENALTY.max(PENALTY_FACTOR * amount)
}

/// Weights of the fitness components.
///
/// A weight of 0 disables its term.
///
/// # Examples
///
/// ```
/// use u_routeswarm::evaluation::FitnessWeights;
///
/// let w = FitnessWeights::default().with_waiting_time(0.0).with_distance(1.0);
/// assert_eq!(w.waiting_time, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitnessWeights {
    /// Weight of the number of vehicles used.
    pub vehicles: f64,
    /// Weight of total travel distance.
    pub distance: f64,
    /// Weight of total service time.
    pub service_time: f64,
    /// Weight of total customer waiting time.
    pub waiting_time: f64,
    /// Weight of the time-window penalty.
    pub time_window: f64,
    /// Weight of the capacity penalty.
    pub capacity: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            vehicles: 0.15,
            distance: 0.15,
            service_time: 0.15,
            waiting_time: 0.15,
            time_window: 0.15,
            capacity: 0.10,
        }
    }
}

impl FitnessWeights {
    pub fn with_vehicles(mut self, w: f64) -> Self {
        self.vehicles = w;
        self
    }

    pub fn with_distance(mut self, w: f64) -> Self {
        self.distance = w;
        self
    }

    pub fn with_service_time(mut self, w: f64) -> Self {
        self.service_time = w;
        self
    }

    pub fn with_waiting_time(mut self, w: f64) -> Self {
        self.waiting_time = w;
        self
    }

    pub fn with_time_window(mut self, w: f64) -> Self {
        self.time_window = w;
        self
    }

    pub fn with_capacity(mut self, w: f64) -> Self {
        self.capacity = w;
        self
    }

    /// Validates the weights.
    pub fn validate(&self) -> Result<(), String> {
        let all = [
            self.vehicles,
            self.distance,
            self.service_time,
            self.waiting_time,
            self.time_window,
            self.capacity,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("fitness weights must be finite and non-negative".into());
        }
        Ok(())
    }
}

/// Unweighted fitness components of a route or solution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitnessBreakdown {
    /// Number of non-empty routes.
    pub active_routes: usize,
    pub distance: f64,
    pub service_time: f64,
    pub waiting_time: f64,
    /// Sum of time-window penalties (zero when every window is met).
    pub tw_penalty: f64,
    /// Sum of capacity penalties, including unmatched pickup/delivery pairs.
    pub capacity_penalty: f64,
}

impl FitnessBreakdown {
    /// Weighted scalar fitness. Lower is better.
    pub fn weighted(&self, w: &FitnessWeights) -> f64 {
        w.vehicles * self.active_routes as f64
            + w.distance * self.distance
            + w.service_time * self.service_time
            + w.waiting_time * self.waiting_time
            + w.time_window * self.tw_penalty
            + w.capacity * self.capacity_penalty
    }

    /// Returns `true` if no penalty term is charged.
    pub fn is_penalty_free(&self) -> bool {
        self.tw_penalty == 0.0 && self.capacity_penalty == 0.0
    }

    fn add(&mut self, other: &FitnessBreakdown) {
        self.active_routes += other.active_routes;
        self.distance += other.distance;
        self.service_time += other.service_time;
        self.waiting_time += other.waiting_time;
        self.tw_penalty += other.tw_penalty;
        self.capacity_penalty += other.capacity_penalty;
    }
}

/// Scores routes and solutions against one instance.
///
/// Unlike the feasibility gate, the evaluator never rejects: every violation
/// is charged `max(100, 10 × amount)` so infeasible candidates can still be
/// ranked during exploration.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    instance: &'a Instance,
    weights: FitnessWeights,
}

impl<'a> Evaluator<'a> {
    pub fn new(instance: &'a Instance, weights: FitnessWeights) -> Self {
        Self { instance, weights }
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Components of one route.
    pub fn route_breakdown(&self, route: &Route) -> FitnessBreakdown {
        self.stops_breakdown(route.stops(), route.capacity())
    }

    /// Weighted fitness of one route.
    pub fn route_fitness(&self, route: &Route) -> f64 {
        self.route_breakdown(route).weighted(&self.weights)
    }

    /// Components summed over every route of `solution`.
    pub fn breakdown(&self, solution: &Solution) -> FitnessBreakdown {
        let mut total = FitnessBreakdown::default();
        for route in solution.routes() {
            total.add(&self.route_breakdown(route));
        }
        total
    }

    /// Weighted fitness of `solution`. Always finite for finite input.
    pub fn fitness(&self, solution: &Solution) -> f64 {
        self.breakdown(solution).weighted(&self.weights)
    }

    /// Computes the fitness and caches it on `solution`.
    pub fn evaluate(&self, solution: &mut Solution) -> f64 {
        let f = self.fitness(solution);
        solution.set_fitness(f);
        f
    }

    pub(crate) fn stops_breakdown(&self, stops: &[usize], capacity: f64) -> FitnessBreakdown {
        let inst = self.instance;
        let mut out = FitnessBreakdown::default();
        if stops.is_empty() {
            return out;
        }
        out.active_routes = 1;
        out.distance = inst.distances().tour_length(stops);

        let mut load = departure_load(stops, inst);
        if load > capacity {
            out.capacity_penalty += violation_penalty(load - capacity);
        }

        let mut clock = 0.0;
        let mut prev = 0;
        for (pos, &s) in stops.iter().enumerate() {
            let loc = inst.location(s);

            if loc.is_delivery() {
                load -= loc.delivery_demand();
                if load < 0.0 {
                    out.capacity_penalty += violation_penalty(-load);
                    load = 0.0;
                }
            }
            if loc.is_pickup() {
                load += loc.pickup_demand();
                if load > capacity {
                    out.capacity_penalty += violation_penalty(load - capacity);
                }
            }
            if let Some(sibling) = loc.pair() {
                let placed = match stops.iter().position(|&x| x == sibling) {
                    Some(sp) if loc.is_pickup() => pos < sp,
                    Some(sp) => sp < pos,
                    None => false,
                };
                if !placed {
                    out.capacity_penalty += MIN_PENALTY;
                }
            }

            let arrival = clock + inst.travel_time(prev, s);
            let tw = loc.time_window();
            out.waiting_time += tw.waiting_time(arrival);
            if tw.is_violated(arrival) {
                out.tw_penalty += violation_penalty(tw.lateness(arrival));
            }
            out.service_time += loc.service_time();
            clock = arrival.max(tw.ready()) + loc.service_time();
            prev = s;
        }

        let back = clock + inst.travel_time(prev, 0);
        let depot_tw = inst.depot().time_window();
        if depot_tw.is_violated(back) {
            out.tw_penalty += violation_penalty(depot_tw.lateness(back));
        }
        out
    }
}
