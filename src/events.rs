//! Structured search events and the sinks that receive them.
//!
//! Engines never log directly: they emit [`SearchEvent`]s into the
//! [`EventSink`] handed to them through the
//! [`SearchContext`](crate::engine::SearchContext).

use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::engine::EngineKind;

/// Search lifecycle stage reported by [`SearchEvent::Phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Building the population from the seeds.
    Init,
    /// Main iteration loop.
    Search,
    /// Population refresh (ACO and GWO every 10 iterations).
    Diversify,
    /// SHO greedy reassignment after the main loop.
    PostProcess,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Init => "init",
            Phase::Search => "search",
            Phase::Diversify => "diversify",
            Phase::PostProcess => "post-process",
        };
        f.write_str(s)
    }
}

/// Event kind carried by a [`SearchEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    TrialStarted,
    /// The engine's best-so-far improved.
    NewBest { iteration: usize, fitness: f64 },
    /// Periodic heartbeat.
    Progress { iteration: usize, best_fitness: f64 },
    Phase { phase: Phase },
    TrialFinished { best_fitness: f64, elapsed: Duration },
    TrialFailed { reason: String },
}

/// One event from one trial of one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEvent {
    pub engine: EngineKind,
    pub trial: usize,
    pub kind: EventKind,
}

/// Receiver of search events.
///
/// Called from worker threads; implementations must be thread-safe.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SearchEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &SearchEvent) {
        let engine = event.engine;
        let trial = event.trial;
        match &event.kind {
            EventKind::TrialStarted => {
                info!(engine = %engine, trial, "Trial started");
            }
            EventKind::NewBest { iteration, fitness } => {
                info!(engine = %engine, trial, iteration, fitness, "New best");
            }
            EventKind::Progress {
                iteration,
                best_fitness,
            } => {
                debug!(engine = %engine, trial, iteration, best_fitness, "Progress");
            }
            EventKind::Phase { phase } => {
                info!(engine = %engine, trial, phase = %phase, "Phase");
            }
            EventKind::TrialFinished {
                best_fitness,
                elapsed,
            } => {
                info!(
                    engine = %engine,
                    trial,
                    best_fitness,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Trial finished"
                );
            }
            EventKind::TrialFailed { reason } => {
                warn!(engine = %engine, trial, reason = %reason, "Trial failed");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &SearchEvent) {}
}

/// Stores every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SearchEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events received so far.
    pub fn events(&self) -> Vec<SearchEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Removes and returns the stored events.
    pub fn drain(&self) -> Vec<SearchEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &SearchEvent) {
        self.events.lock().push(event.clone());
    }
}
