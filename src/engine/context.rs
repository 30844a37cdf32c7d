//! Per-trial search context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::EngineKind;
use crate::evaluation::Evaluator;
use crate::events::{EventKind, EventSink, NullSink, SearchEvent};
use crate::instance::Instance;

static NULL_SINK: NullSink = NullSink;

/// Everything an engine needs besides its configuration and seeds.
///
/// The instance and evaluator are shared read-only. The event sink is the
/// injected logger. The cancel flag and deadline are optional stop
/// conditions checked once per iteration.
#[derive(Clone)]
pub struct SearchContext<'a> {
    evaluator: Evaluator<'a>,
    sink: &'a dyn EventSink,
    trial: usize,
    cancel: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
    log_interval: usize,
}

impl<'a> SearchContext<'a> {
    /// A context that discards events and never stops early.
    pub fn new(evaluator: Evaluator<'a>) -> Self {
        Self {
            evaluator,
            sink: &NULL_SINK,
            trial: 0,
            cancel: None,
            deadline: None,
            log_interval: 100,
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn EventSink) -> Self {
        self.sink = sink;
        self
    }

    /// Trial number stamped on every emitted event.
    pub fn with_trial(mut self, trial: usize) -> Self {
        self.trial = trial;
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Emit a progress event every `n` iterations. 0 disables progress events.
    pub fn with_log_interval(mut self, n: usize) -> Self {
        self.log_interval = n;
        self
    }

    pub fn instance(&self) -> &'a Instance {
        self.evaluator.instance()
    }

    pub fn evaluator(&self) -> &Evaluator<'a> {
        &self.evaluator
    }

    pub fn trial(&self) -> usize {
        self.trial
    }

    /// Returns `true` once the cancel flag is set or the deadline passed.
    pub fn should_stop(&self) -> bool {
        if let Some(ref flag) = self.cancel {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn emit(&self, engine: EngineKind, kind: EventKind) {
        self.sink.emit(&SearchEvent {
            engine,
            trial: self.trial,
            kind,
        });
    }

    /// Emits [`EventKind::Progress`] when `iteration` falls on the log interval.
    pub fn progress(&self, engine: EngineKind, iteration: usize, best_fitness: f64) {
        if self.log_interval > 0 && iteration % self.log_interval == 0 {
            self.emit(
                engine,
                EventKind::Progress {
                    iteration,
                    best_fitness,
                },
            );
        }
    }
}

impl std::fmt::Debug for SearchContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchContext")
            .field("trial", &self.trial)
            .field("cancel", &self.cancel)
            .field("deadline", &self.deadline)
            .field("log_interval", &self.log_interval)
            .finish_non_exhaustive()
    }
}
