//! Whale Optimization Algorithm (WOA).
//!
//! Every route of every whale takes one of three moves per iteration:
//! encircling the best whale's route of the same vehicle slot when
//! `|A| < 1`, exploring with a random operator or a multi-route move when
//! `|A| >= 1`, or a logarithmic spiral around the best route. Rounded
//! coordinates outside the valid index range leave the stop in place.
//!
//! # References
//!
//! - Mirjalili & Lewis (2016), "The Whale Optimization Algorithm"

mod config;
mod runner;

pub use config::WoaConfig;
pub use runner::WoaRunner;
