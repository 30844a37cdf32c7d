//! Crate error type.

use crate::engine::EngineKind;

/// Errors raised while validating input or running engines.
///
/// An infeasible mutation is not an error: the feasibility gate returns
/// `false` and the caller reverts.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// The instance has no customer locations.
    EmptyInstance,
    /// No vehicle slots (routes) were supplied.
    NoVehicles,
    /// Location 0 is not flagged as the depot.
    MissingDepot,
    /// A location carries unusable data.
    InvalidLocation {
        /// Index of the offending location.
        index: usize,
        /// Human-readable description.
        reason: String,
    },
    /// The vehicle capacity is not a positive finite number.
    InvalidCapacity(f64),
    /// An explicit matrix does not match the number of locations.
    MatrixSize {
        /// Number of locations in the instance.
        expected: usize,
        /// Size of the supplied matrix.
        actual: usize,
    },
    /// A route refers to a location outside `[1, num_locations)`.
    IndexOutOfRange {
        /// Route (vehicle slot) index.
        route: usize,
        /// Position inside the route.
        position: usize,
        /// The offending location index.
        index: usize,
        /// Number of locations in the instance, depot included.
        num_locations: usize,
    },
    /// The routes do not cover every customer exactly once.
    CoverageViolation {
        /// Customers absent from every route.
        missing: Vec<usize>,
        /// Customers present more than once.
        duplicated: Vec<usize>,
    },
    /// An engine configuration failed validation.
    InvalidConfig {
        /// Engine owning the configuration.
        engine: EngineKind,
        /// Validation message.
        reason: String,
    },
    /// One engine trial returned an error or panicked.
    EngineFailed {
        /// Engine that failed.
        engine: EngineKind,
        /// Failure description.
        reason: String,
    },
    /// No engine produced a solution.
    AllEnginesFailed,
}

impl std::fmt::Display for RoutingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingError::EmptyInstance => write!(f, "instance has no customer locations"),
            RoutingError::NoVehicles => write!(f, "no vehicle routes were supplied"),
            RoutingError::MissingDepot => write!(f, "location 0 must be the depot"),
            RoutingError::InvalidLocation { index, reason } => {
                write!(f, "location {index} is invalid: {reason}")
            }
            RoutingError::InvalidCapacity(c) => {
                write!(f, "vehicle capacity must be positive and finite, got {c}")
            }
            RoutingError::MatrixSize { expected, actual } => {
                write!(f, "matrix covers {actual} locations, instance has {expected}")
            }
            RoutingError::IndexOutOfRange {
                route,
                position,
                index,
                num_locations,
            } => write!(
                f,
                "route {route} position {position}: location index {index} outside [1, {num_locations})"
            ),
            RoutingError::CoverageViolation {
                missing,
                duplicated,
            } => write!(
                f,
                "routes do not cover every location once (missing {missing:?}, duplicated {duplicated:?})"
            ),
            RoutingError::InvalidConfig { engine, reason } => {
                write!(f, "invalid {engine} configuration: {reason}")
            }
            RoutingError::EngineFailed { engine, reason } => {
                write!(f, "{engine} failed: {reason}")
            }
            RoutingError::AllEnginesFailed => write!(f, "no engine produced a solution"),
        }
    }
}

impl std::error::Error for RoutingError {}
