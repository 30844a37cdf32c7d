//! Parallel orchestration of the engines.
//!
//! The [`Orchestrator`] runs every configured engine, optionally several
//! independent trials each, on a rayon worker pool. Each trial gets its own
//! seed derived from one base seed, so a seeded run is reproducible and a
//! parallel run returns exactly what a sequential one would. Failing or
//! panicking trials are isolated and reported; the [`PerformanceMonitor`]
//! aggregates per-engine timing and fitness statistics.

mod monitor;
mod orchestrator;

pub use monitor::{ComponentSummary, EngineStats, PerformanceMonitor, RunProgress, Summary};
pub use orchestrator::{ExecutionMode, Orchestrator, RunReport};
