//! Domain model types.
//!
//! Locations with demands and time windows, routes as ordered stop
//! sequences with cached distance and feasibility, complete solutions, and
//! the agent wrapper every engine uses for its population.

mod agent;
mod location;
mod route;
mod solution;

pub use agent::Agent;
pub(crate) use agent::{best_index, sort_by_fitness};
pub use location::{Location, TimeWindow};
pub use route::Route;
pub use solution::Solution;
