//! Location and time window types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Earliest/latest permissible arrival at a stop (`ltw`/`utw`).
///
/// Arriving before `ready` means waiting; arriving after `due` violates
/// the window.
///
/// # Examples
///
/// ```
/// use u_routeswarm::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!((tw.waiting_time(80.0) - 20.0).abs() < 1e-10);
/// assert!(tw.is_violated(200.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a time window.
    ///
    /// Returns `None` if `ready > due`, `ready` is negative, or either value
    /// is NaN. `due` may be `f64::INFINITY`.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        if ready.is_nan() || due.is_nan() || !ready.is_finite() || ready < 0.0 || ready > due {
            return None;
        }
        Some(Self { ready, due })
    }

    /// A window that never binds: `[0, +inf)`.
    pub fn unbounded() -> Self {
        Self {
            ready: 0.0,
            due: f64::INFINITY,
        }
    }

    /// Earliest allowable arrival (`ltw`).
    pub fn ready(&self) -> f64 {
        self.ready
    }

    /// Latest allowable arrival (`utw`).
    pub fn due(&self) -> f64 {
        self.due
    }

    /// Waiting time when arriving at `arrival`. Zero if not early.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        (self.ready - arrival).max(0.0)
    }

    /// Time past `due` when arriving at `arrival`. Zero if on time.
    pub fn lateness(&self, arrival: f64) -> f64 {
        (arrival - self.due).max(0.0)
    }

    /// Returns `true` if arriving at `arrival` violates this window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.due
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A stop (or the depot) of a routing instance.
///
/// A stop may pick up, deliver, or both. When it does both, its service
/// time is the sum of the two durations. Paired stops (`pair`) form a
/// pickup-and-delivery request that must be served by one vehicle, pickup
/// first.
///
/// Locations are immutable once the [`Instance`](crate::instance::Instance)
/// is built.
///
/// # Examples
///
/// ```
/// use u_routeswarm::models::{Location, TimeWindow};
///
/// let depot = Location::depot(0.0, 0.0);
/// assert!(depot.is_depot());
///
/// let stop = Location::new(1, 3.0, 4.0)
///     .with_pickup(5.0, 2.0)
///     .with_delivery(3.0, 1.0)
///     .with_time_window(TimeWindow::new(0.0, 100.0).unwrap());
/// assert!((stop.service_time() - 3.0).abs() < 1e-10);
/// assert!((stop.distance_to(&depot) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    index: usize,
    x: f64,
    y: f64,
    pickup_demand: f64,
    delivery_demand: f64,
    pickup_service: f64,
    delivery_service: f64,
    time_window: TimeWindow,
    is_pickup: bool,
    is_delivery: bool,
    is_depot: bool,
    pair: Option<usize>,
}

impl Location {
    /// Creates a stop with no demand, no service time and an unbounded window.
    pub fn new(index: usize, x: f64, y: f64) -> Self {
        Self {
            index,
            x,
            y,
            pickup_demand: 0.0,
            delivery_demand: 0.0,
            pickup_service: 0.0,
            delivery_service: 0.0,
            time_window: TimeWindow::unbounded(),
            is_pickup: false,
            is_delivery: false,
            is_depot: false,
            pair: None,
        }
    }

    /// Creates the depot (index 0).
    pub fn depot(x: f64, y: f64) -> Self {
        Self {
            is_depot: true,
            ..Self::new(0, x, y)
        }
    }

    /// Marks this stop as a pickup of `demand` units taking `service` time.
    pub fn with_pickup(mut self, demand: f64, service: f64) -> Self {
        self.is_pickup = true;
        self.pickup_demand = demand;
        self.pickup_service = service;
        self
    }

    /// Marks this stop as a delivery of `demand` units taking `service` time.
    pub fn with_delivery(mut self, demand: f64, service: f64) -> Self {
        self.is_delivery = true;
        self.delivery_demand = demand;
        self.delivery_service = service;
        self
    }

    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = tw;
        self
    }

    /// Links this stop to its pickup/delivery sibling.
    pub fn with_pair(mut self, sibling: usize) -> Self {
        self.pair = Some(sibling);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn pickup_demand(&self) -> f64 {
        self.pickup_demand
    }

    pub fn delivery_demand(&self) -> f64 {
        self.delivery_demand
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    pub fn is_pickup(&self) -> bool {
        self.is_pickup
    }

    pub fn is_delivery(&self) -> bool {
        self.is_delivery
    }

    pub fn is_depot(&self) -> bool {
        self.is_depot
    }

    /// Sibling stop of a paired request, if any.
    pub fn pair(&self) -> Option<usize> {
        self.pair
    }

    /// Service duration at this stop.
    ///
    /// Pickup plus delivery time for a stop that does both, otherwise the
    /// duration of its single role. Zero for the depot.
    pub fn service_time(&self) -> f64 {
        match (self.is_pickup, self.is_delivery) {
            (true, true) => self.pickup_service + self.delivery_service,
            (true, false) => self.pickup_service,
            (false, true) => self.delivery_service,
            (false, false) => 0.0,
        }
    }

    /// Euclidean distance to another location.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(-1.0, 10.0).is_none());
        assert!(TimeWindow::new(0.0, f64::INFINITY).is_some());
    }

    #[test]
    fn test_time_window_waiting_and_lateness() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!((tw.waiting_time(4.0) - 6.0).abs() < 1e-10);
        assert_eq!(tw.waiting_time(15.0), 0.0);
        assert!((tw.lateness(23.0) - 3.0).abs() < 1e-10);
        assert_eq!(tw.lateness(20.0), 0.0);
        assert!(!tw.is_violated(20.0));
        assert!(tw.is_violated(20.1));
    }

    #[test]
    fn test_service_time_by_role() {
        let both = Location::new(1, 0.0, 0.0)
            .with_pickup(1.0, 2.0)
            .with_delivery(1.0, 3.0);
        assert!((both.service_time() - 5.0).abs() < 1e-10);

        let pick = Location::new(2, 0.0, 0.0).with_pickup(1.0, 2.0);
        assert!((pick.service_time() - 2.0).abs() < 1e-10);

        let drop = Location::new(3, 0.0, 0.0).with_delivery(1.0, 3.0);
        assert!((drop.service_time() - 3.0).abs() < 1e-10);

        assert_eq!(Location::depot(0.0, 0.0).service_time(), 0.0);
    }

    #[test]
    fn test_pair_link() {
        let p = Location::new(1, 0.0, 0.0).with_pickup(2.0, 0.0).with_pair(2);
        assert_eq!(p.pair(), Some(2));
        assert!(p.is_pickup());
        assert!(!p.is_delivery());
    }
}
