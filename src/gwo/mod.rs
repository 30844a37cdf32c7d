//! Grey Wolf Optimizer (GWO).
//!
//! The three best distinct solutions lead the pack (alpha, beta, delta).
//! Each wolf moves every route toward the leaders' routes of the same
//! vehicle slot, treating stop indices as coordinates, then the rounded
//! result is repaired back into a permutation of the route's stops. The
//! coefficient `a` shrinks linearly to 0, moving the pack from exploration
//! to exploitation.
//!
//! # References
//!
//! - Mirjalili, Mirjalili & Lewis (2014), "Grey Wolf Optimizer"

mod config;
mod runner;

pub use config::GwoConfig;
pub use runner::GwoRunner;
