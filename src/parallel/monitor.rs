//! Per-engine run statistics and live progress counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::engine::EngineKind;
use crate::evaluation::FitnessBreakdown;

/// Min / max / mean / population standard deviation of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl Summary {
    /// `None` for an empty sample.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std_dev: var.sqrt(),
        })
    }
}

/// [`Summary`] of every fitness component over an engine's trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentSummary {
    pub active_routes: Summary,
    pub distance: Summary,
    pub service_time: Summary,
    pub waiting_time: Summary,
    pub tw_penalty: Summary,
    pub capacity_penalty: Summary,
}

impl ComponentSummary {
    fn of(breakdowns: &[FitnessBreakdown]) -> Option<Self> {
        let col = |f: fn(&FitnessBreakdown) -> f64| {
            Summary::of(&breakdowns.iter().map(f).collect::<Vec<_>>())
        };
        Some(Self {
            active_routes: col(|b| b.active_routes as f64)?,
            distance: col(|b| b.distance)?,
            service_time: col(|b| b.service_time)?,
            waiting_time: col(|b| b.waiting_time)?,
            tw_penalty: col(|b| b.tw_penalty)?,
            capacity_penalty: col(|b| b.capacity_penalty)?,
        })
    }
}

/// What one trial produced.
#[derive(Debug, Clone, Copy)]
struct TrialRecord {
    trial: usize,
    elapsed: Duration,
    /// Best fitness and its components; `None` if the trial failed.
    outcome: Option<(f64, FitnessBreakdown)>,
}

/// Aggregated statistics of one engine over all its trials.
#[derive(Debug, Clone)]
pub struct EngineStats {
    pub kind: EngineKind,

    /// Trials run, successful or not.
    pub trials: usize,

    pub failures: usize,

    /// Wall time of every trial, in trial order.
    pub trial_times: Vec<Duration>,

    /// Best fitness of every successful trial, in trial order.
    pub trial_fitness: Vec<f64>,

    /// Lowest fitness over all trials.
    pub best_fitness: Option<f64>,

    pub min_time: Duration,
    pub max_time: Duration,
    pub avg_time: Duration,

    /// Summary of `trial_fitness`.
    pub fitness: Option<Summary>,

    /// Relative improvement of the last successful trial over the first.
    pub improvement: Option<f64>,

    /// Per-component summary of each successful trial's best solution.
    pub components: Option<ComponentSummary>,
}

impl EngineStats {
    fn from_records(kind: EngineKind, mut records: Vec<TrialRecord>) -> Self {
        records.sort_by_key(|r| r.trial);
        let trial_times: Vec<Duration> = records.iter().map(|r| r.elapsed).collect();
        let (trial_fitness, breakdowns): (Vec<f64>, Vec<FitnessBreakdown>) =
            records.iter().filter_map(|r| r.outcome).unzip();

        let total: Duration = trial_times.iter().sum();
        let avg_time = if trial_times.is_empty() {
            Duration::ZERO
        } else {
            total / trial_times.len() as u32
        };
        let improvement = match (trial_fitness.first(), trial_fitness.last()) {
            (Some(&first), Some(&last)) if trial_fitness.len() > 1 && first != 0.0 => {
                Some((first - last) / first)
            }
            _ => None,
        };

        Self {
            kind,
            trials: records.len(),
            failures: records.iter().filter(|r| r.outcome.is_none()).count(),
            min_time: trial_times.iter().copied().min().unwrap_or_default(),
            max_time: trial_times.iter().copied().max().unwrap_or_default(),
            avg_time,
            best_fitness: trial_fitness.iter().copied().reduce(f64::min),
            fitness: Summary::of(&trial_fitness),
            improvement,
            components: ComponentSummary::of(&breakdowns),
            trial_times,
            trial_fitness,
        }
    }

    /// Sum of trial wall times.
    pub fn total_time(&self) -> Duration {
        self.trial_times.iter().sum()
    }
}

/// Collects trial outcomes for every engine.
///
/// Shared by worker threads behind a lock; records may arrive in any order
/// and are put back in trial order when summarized.
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    records: BTreeMap<EngineKind, Vec<TrialRecord>>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful trial.
    pub fn record_success(
        &mut self,
        kind: EngineKind,
        trial: usize,
        elapsed: Duration,
        best_fitness: f64,
        breakdown: FitnessBreakdown,
    ) {
        self.records.entry(kind).or_default().push(TrialRecord {
            trial,
            elapsed,
            outcome: Some((best_fitness, breakdown)),
        });
    }

    pub fn record_failure(&mut self, kind: EngineKind, trial: usize, elapsed: Duration) {
        self.records.entry(kind).or_default().push(TrialRecord {
            trial,
            elapsed,
            outcome: None,
        });
    }

    pub fn stats(&self, kind: EngineKind) -> Option<EngineStats> {
        self.records
            .get(&kind)
            .map(|r| EngineStats::from_records(kind, r.clone()))
    }

    /// Statistics of every engine that ran at least one trial.
    pub fn all_stats(&self) -> BTreeMap<EngineKind, EngineStats> {
        self.records
            .iter()
            .map(|(&kind, r)| (kind, EngineStats::from_records(kind, r.clone())))
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Live trial counters, readable while a run is in flight.
#[derive(Debug, Default)]
pub struct RunProgress {
    planned: AtomicUsize,
    completed: [AtomicUsize; 5],
    failed: AtomicUsize,
}

impl RunProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&self, planned: usize) {
        self.planned.store(planned, Ordering::Relaxed);
        for c in &self.completed {
            c.store(0, Ordering::Relaxed);
        }
        self.failed.store(0, Ordering::Relaxed);
    }

    pub(crate) fn finish_trial(&self, kind: EngineKind, failed: bool) {
        self.completed[kind as usize].fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Total trials scheduled for the current run.
    pub fn planned(&self) -> usize {
        self.planned.load(Ordering::Relaxed)
    }

    /// Trials of `kind` finished so far, failed ones included.
    pub fn completed(&self, kind: EngineKind) -> usize {
        self.completed[kind as usize].load(Ordering::Relaxed)
    }

    pub fn total_completed(&self) -> usize {
        self.completed
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}
