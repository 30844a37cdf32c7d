//! Simulated Annealing (SA).
//!
//! Single-agent search over complete solutions. Each move perturbs a clone
//! of the current solution with a feasibility-gated operator; the clone
//! replaces the current solution if it is better or with Metropolis
//! probability `exp(-delta / T)`. The best solution is tracked apart from
//! the (possibly worse) current one.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Lundy & Mees (1986), "Convergence of an Annealing Algorithm"

mod config;
mod runner;

pub use config::{CoolingSchedule, SaConfig};
pub use runner::{SaResult, SaRunner};
