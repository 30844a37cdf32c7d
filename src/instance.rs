//! Validated, read-only problem data.

use crate::distance::DistanceMatrix;
use crate::error::RoutingError;
use crate::models::Location;

/// A pickup-and-delivery routing instance with time windows.
///
/// Holds the locations (index 0 is the depot), the vehicle capacity shared
/// by every vehicle, the Euclidean distance matrix, and an optional explicit
/// travel-time matrix. Built once and shared read-only by every engine and
/// worker thread.
///
/// # Examples
///
/// ```
/// use u_routeswarm::instance::Instance;
/// use u_routeswarm::models::Location;
///
/// let locations = vec![
///     Location::depot(0.0, 0.0),
///     Location::new(1, 3.0, 4.0).with_pickup(2.0, 1.0),
/// ];
/// let instance = Instance::new(locations, 10.0).unwrap();
/// assert_eq!(instance.num_locations(), 2);
/// assert!((instance.travel_time(0, 1) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    locations: Vec<Location>,
    capacity: f64,
    distances: DistanceMatrix,
    travel_times: Option<DistanceMatrix>,
    has_pairs: bool,
}

impl Instance {
    /// Validates `locations` and `capacity` and builds the distance matrix.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::EmptyInstance`] if there is no customer besides the depot.
    /// - [`RoutingError::MissingDepot`] if location 0 is not the depot.
    /// - [`RoutingError::InvalidLocation`] for mismatched indices, a second
    ///   depot, non-finite coordinates, negative demand or service time, or
    ///   a broken pickup/delivery pair.
    /// - [`RoutingError::InvalidCapacity`] if `capacity` is not positive.
    pub fn new(locations: Vec<Location>, capacity: f64) -> Result<Self, RoutingError> {
        if locations.len() < 2 {
            return Err(RoutingError::EmptyInstance);
        }
        if !locations[0].is_depot() {
            return Err(RoutingError::MissingDepot);
        }
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(RoutingError::InvalidCapacity(capacity));
        }
        for (pos, loc) in locations.iter().enumerate() {
            validate_location(pos, loc, &locations)?;
        }

        let distances = DistanceMatrix::from_locations(&locations);
        let has_pairs = locations.iter().any(|l| l.pair().is_some());
        Ok(Self {
            locations,
            capacity,
            distances,
            travel_times: None,
            has_pairs,
        })
    }

    /// Attaches an explicit travel-time matrix.
    ///
    /// Without one, travel time equals Euclidean distance.
    pub fn with_travel_times(mut self, travel_times: DistanceMatrix) -> Result<Self, RoutingError> {
        if travel_times.size() != self.locations.len() {
            return Err(RoutingError::MatrixSize {
                expected: self.locations.len(),
                actual: travel_times.size(),
            });
        }
        self.travel_times = Some(travel_times);
        Ok(self)
    }

    /// Number of locations, depot included.
    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    /// Number of customer stops (depot excluded).
    pub fn num_customers(&self) -> usize {
        self.locations.len() - 1
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn location(&self, index: usize) -> &Location {
        &self.locations[index]
    }

    pub fn depot(&self) -> &Location {
        &self.locations[0]
    }

    /// Capacity ceiling of every vehicle.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// Travel time for the arc `from -> to`.
    pub fn travel_time(&self, from: usize, to: usize) -> f64 {
        match &self.travel_times {
            Some(m) => m.get(from, to),
            None => self.distances.get(from, to),
        }
    }

    /// Returns `true` if some stop is linked to a pickup/delivery sibling.
    pub fn has_pairs(&self) -> bool {
        self.has_pairs
    }
}

fn validate_location(pos: usize, loc: &Location, all: &[Location]) -> Result<(), RoutingError> {
    let invalid = |reason: String| RoutingError::InvalidLocation { index: pos, reason };

    if loc.index() != pos {
        return Err(invalid(format!("declared index {} at position {pos}", loc.index())));
    }
    if pos > 0 && loc.is_depot() {
        return Err(invalid("only location 0 may be the depot".into()));
    }
    if !loc.x().is_finite() || !loc.y().is_finite() {
        return Err(invalid("coordinates must be finite".into()));
    }
    for (name, v) in [
        ("pickup demand", loc.pickup_demand()),
        ("delivery demand", loc.delivery_demand()),
        ("service time", loc.service_time()),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(invalid(format!("{name} must be finite and non-negative, got {v}")));
        }
    }
    if let Some(sibling) = loc.pair() {
        if pos == 0 {
            return Err(invalid("the depot cannot be paired".into()));
        }
        if sibling == 0 || sibling == pos || sibling >= all.len() {
            return Err(invalid(format!("pair {sibling} is not another customer")));
        }
        if all[sibling].pair() != Some(pos) {
            return Err(invalid(format!("pair {sibling} does not link back")));
        }
        let pickup_side = loc.is_pickup() && !loc.is_delivery();
        let delivery_side = loc.is_delivery() && !loc.is_pickup();
        if !pickup_side && !delivery_side {
            return Err(invalid("a paired stop must be pickup-only or delivery-only".into()));
        }
        if loc.is_pickup() == all[sibling].is_pickup() {
            return Err(invalid(format!("pair {sibling} has the same role")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops() -> Vec<Location> {
        vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 1.0, 0.0).with_pickup(2.0, 1.0),
            Location::new(2, 2.0, 0.0).with_delivery(2.0, 1.0),
        ]
    }

    #[test]
    fn test_new_ok() {
        let inst = Instance::new(stops(), 5.0).expect("valid");
        assert_eq!(inst.num_locations(), 3);
        assert_eq!(inst.num_customers(), 2);
        assert!(!inst.has_pairs());
    }

    #[test]
    fn test_rejects_degenerate() {
        assert_eq!(
            Instance::new(vec![Location::depot(0.0, 0.0)], 5.0).unwrap_err(),
            RoutingError::EmptyInstance
        );
        let mut locs = stops();
        locs[0] = Location::new(0, 0.0, 0.0);
        assert_eq!(Instance::new(locs, 5.0).unwrap_err(), RoutingError::MissingDepot);
        assert!(matches!(
            Instance::new(stops(), 0.0),
            Err(RoutingError::InvalidCapacity(_))
        ));
    }

    #[test]
    fn test_rejects_index_mismatch() {
        let mut locs = stops();
        locs[2] = Location::new(7, 2.0, 0.0);
        assert!(matches!(
            Instance::new(locs, 5.0),
            Err(RoutingError::InvalidLocation { index: 2, .. })
        ));
    }

    #[test]
    fn test_pair_must_link_back() {
        let mut locs = stops();
        locs[1] = locs[1].clone().with_pair(2);
        assert!(Instance::new(locs.clone(), 5.0).is_err());

        locs[2] = locs[2].clone().with_pair(1);
        let inst = Instance::new(locs, 5.0).expect("valid pair");
        assert!(inst.has_pairs());
    }

    #[test]
    fn test_travel_times_override() {
        let inst = Instance::new(stops(), 5.0).expect("valid");
        let tt = DistanceMatrix::from_data(3, vec![0.0, 7.0, 7.0, 7.0, 0.0, 7.0, 7.0, 7.0, 0.0])
            .expect("grid");
        let inst = inst.with_travel_times(tt).expect("size matches");
        assert!((inst.travel_time(0, 1) - 7.0).abs() < 1e-10);
        assert!((inst.distance(0, 1) - 1.0).abs() < 1e-10);

        let bad = DistanceMatrix::new(2);
        assert!(matches!(
            inst.with_travel_times(bad),
            Err(RoutingError::MatrixSize { expected: 3, actual: 2 })
        ));
    }
}
