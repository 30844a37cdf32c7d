//! Vehicle routing with time windows and pickup-and-delivery, solved by a
//! portfolio of metaheuristics run side by side.
//!
//! Five engines share one problem model, one evaluator and one operator
//! toolkit:
//!
//! - **Simulated Annealing (SA)**: single-solution trajectory search with
//!   Metropolis acceptance and pluggable cooling schedules.
//! - **Ant Colony Optimization (ACO)**: routes rebuilt from a bounded
//!   pheromone matrix, with periodic restarts of the worst ants.
//! - **Grey Wolf Optimizer (GWO)**: packs guided by the three best distinct
//!   solutions (alpha, beta, delta).
//! - **Whale Optimization Algorithm (WOA)**: encircling and spiral moves
//!   toward the best whale.
//! - **Spotted Hyena Optimizer (SHO)**: hyenas learning from the prey's
//!   routes, followed by a greedy reassignment pass.
//!
//! The [`parallel::Orchestrator`] runs every engine, optionally over
//! several independent trials, on a worker pool and picks the overall best.
//! A failing engine is isolated and reported without stopping the others.
//!
//! # Model
//!
//! Location 0 is the depot. A [`models::Route`] is the ordered list of
//! customer indices one vehicle visits; a [`models::Solution`] holds one
//! route per vehicle and covers every customer exactly once. Every mutation
//! goes through a feasibility gate (time windows, capacity, pickup before
//! its paired delivery) and is reverted when it fails, so engines only ever
//! hold feasible, covering solutions.
//!
//! Solutions are scored by a weighted sum of active vehicles, distance,
//! service time, waiting time and constraint penalties; lower is better.
//!
//! # Example
//!
//! ```
//! use u_routeswarm::engine::EngineSpec;
//! use u_routeswarm::evaluation::{Evaluator, FitnessWeights};
//! use u_routeswarm::instance::Instance;
//! use u_routeswarm::models::{Location, Solution, TimeWindow};
//! use u_routeswarm::parallel::{ExecutionMode, Orchestrator};
//! use u_routeswarm::sa::SaConfig;
//! use u_routeswarm::woa::WoaConfig;
//!
//! let tw = TimeWindow::new(0.0, 1000.0).unwrap();
//! let mut locations = vec![Location::depot(0.0, 0.0)];
//! for (i, (x, y)) in [(2.0, 1.0), (4.0, 3.0), (1.0, 5.0), (6.0, 2.0)].iter().enumerate() {
//!     locations.push(
//!         Location::new(i + 1, *x, *y)
//!             .with_pickup(2.0, 1.0)
//!             .with_time_window(tw),
//!     );
//! }
//! let instance = Instance::new(locations, 10.0).unwrap();
//! let seed = Solution::from_index_sequences(&[vec![1, 2], vec![3, 4]], &instance).unwrap();
//!
//! let report = Orchestrator::new(Evaluator::new(&instance, FitnessWeights::default()))
//!     .with_mode(ExecutionMode::Sequential)
//!     .with_seed(42)
//!     .run_all(
//!         &[
//!             EngineSpec::Sa(SaConfig::default().with_iterations_per_temperature(20)),
//!             EngineSpec::Woa(WoaConfig::default().with_max_iterations(20)),
//!         ],
//!         &[seed],
//!     )
//!     .unwrap();
//!
//! assert!(report.best.covers_all(instance.num_locations()));
//! assert!(report.best.is_feasible());
//! ```
//!
//! # Logging
//!
//! Engines never log directly. They emit [`events::SearchEvent`]s into an
//! [`events::EventSink`] carried by their [`engine::SearchContext`];
//! [`events::TracingSink`] forwards them to `tracing`.

pub mod aco;
pub mod distance;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod events;
pub mod gwo;
pub mod instance;
pub mod models;
pub mod operators;
pub mod parallel;
pub mod random;
pub mod sa;
pub mod sho;
pub mod woa;

pub use error::RoutingError;
