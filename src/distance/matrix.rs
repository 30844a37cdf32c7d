//! Dense distance matrix.

use crate::models::Location;

/// A dense n×n matrix stored in row-major order.
///
/// Holds Euclidean distances computed from location coordinates, or an
/// explicit grid such as per-arc travel times.
///
/// # Examples
///
/// ```
/// use u_routeswarm::models::Location;
/// use u_routeswarm::distance::DistanceMatrix;
///
/// let locations = vec![
///     Location::depot(0.0, 0.0),
///     Location::new(1, 3.0, 4.0),
///     Location::new(2, 6.0, 8.0),
/// ];
/// let dm = DistanceMatrix::from_locations(&locations);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a Euclidean distance matrix from location coordinates.
    pub fn from_locations(locations: &[Location]) -> Self {
        let n = locations.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = locations[i].distance_to(&locations[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Creates a matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size` or any
    /// entry is negative, NaN or infinite.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size || data.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return None;
        }
        Some(Self { data, size })
    }

    /// Returns the entry for the arc `from -> to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    pub(crate) fn set(&mut self, from: usize, to: usize, value: f64) {
        self.data[from * self.size + to] = value;
    }

    /// Number of locations covered by this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Nearest of `candidates` to `from`. `None` if `candidates` is empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }

    /// Length of the closed tour `0 -> stops... -> 0`.
    ///
    /// Zero for an empty sequence.
    pub fn tour_length(&self, stops: &[usize]) -> f64 {
        let (Some(&first), Some(&last)) = (stops.first(), stops.last()) else {
            return 0.0;
        };
        let inner: f64 = stops.windows(2).map(|w| self.get(w[0], w[1])).sum();
        self.get(0, first) + inner + self.get(last, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Location> {
        vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 3.0, 4.0),
            Location::new(2, 0.0, 8.0),
        ]
    }

    #[test]
    fn test_symmetric_euclidean() {
        let dm = DistanceMatrix::from_locations(&sample());
        assert!((dm.get(1, 2) - 5.0).abs() < 1e-10);
        assert!((dm.get(2, 1) - 5.0).abs() < 1e-10);
        assert_eq!(dm.get(1, 1), 0.0);
    }

    #[test]
    fn test_from_data_rejects_bad_grid() {
        assert!(DistanceMatrix::from_data(2, vec![0.0; 3]).is_none());
        assert!(DistanceMatrix::from_data(2, vec![0.0, -1.0, 1.0, 0.0]).is_none());
        assert!(DistanceMatrix::from_data(2, vec![0.0, f64::INFINITY, 1.0, 0.0]).is_none());
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, f64::NAN, 0.0]).is_none());
        assert!(DistanceMatrix::from_data(2, vec![0.0, 2.0, 1.0, 0.0]).is_some());
    }

    #[test]
    fn test_tour_length() {
        let dm = DistanceMatrix::from_locations(&sample());
        // 0->1 (5) + 1->2 (5) + 2->0 (8)
        assert!((dm.tour_length(&[1, 2]) - 18.0).abs() < 1e-10);
        assert_eq!(dm.tour_length(&[]), 0.0);
    }

    #[test]
    fn test_nearest_neighbor() {
        let dm = DistanceMatrix::from_locations(&sample());
        assert_eq!(dm.nearest_neighbor(0, &[1, 2]), Some(1));
        assert_eq!(dm.nearest_neighbor(0, &[]), None);
    }
}
