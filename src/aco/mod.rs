//! Ant Colony Optimization (ACO).
//!
//! Each ant holds a complete solution. Per iteration, every route of every
//! ant is either rebuilt stop by stop from the pheromone trails (next stop
//! drawn with probability `tau^alpha * eta^beta`, `eta = 1 / distance`) or
//! perturbed by a random toolkit operator. Trails then evaporate and the
//! best-so-far tour is reinforced with `Q / best_fitness`.
//!
//! # References
//!
//! - Dorigo, Maniezzo & Colorni (1996), "Ant System: Optimization by a Colony of Cooperating Agents"
//! - Stützle & Hoos (2000), "MAX-MIN Ant System"

mod config;
mod pheromone;
mod runner;

pub use config::AcoConfig;
pub use pheromone::PheromoneMatrix;
pub use runner::AcoRunner;
