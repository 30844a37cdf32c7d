//! Spotted Hyena Optimizer (SHO).
//!
//! The best solution is the prey. Each route of each hyena either explores
//! (`B > 1`) or, once the encircling term `|E|` drops below 1, learns from
//! the prey's route of the same vehicle slot by swapping stops toward their
//! relative positions there. The learning intensity scales with a route
//! distance mixing shared stops and shared positions. `h` decays linearly
//! from its maximum to 0.
//!
//! After the main loop a greedy pass reassigns every stop, closest to the
//! depot first, to the first vehicle that can take it, then reorders each
//! vehicle by nearest neighbour. The result replaces the prey only if it is
//! feasible and no worse.
//!
//! # References
//!
//! - Dhiman & Kumar (2017), "Spotted hyena optimizer: A novel bio-inspired
//!   based metaheuristic technique for engineering applications"

mod config;
pub mod greedy;
mod runner;

pub use config::ShoConfig;
pub use runner::ShoRunner;
