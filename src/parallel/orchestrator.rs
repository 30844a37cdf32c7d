//! Runs every engine and every trial, isolating failures.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{info, warn};

use super::monitor::{EngineStats, PerformanceMonitor, RunProgress};
use crate::engine::moves::validate_seeds;
use crate::engine::{EngineKind, EngineResult, EngineSpec, SearchContext};
use crate::error::RoutingError;
use crate::evaluation::Evaluator;
use crate::events::{EventKind, EventSink, TracingSink};
use crate::models::Solution;
use crate::random::derive_seed;
use crate::sa::{SaConfig, SaRunner};

static TRACING_SINK: TracingSink = TracingSink;

/// How trials are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// On a dedicated worker pool. `None` sizes the pool from the available
    /// CPU parallelism.
    Parallel { threads: Option<usize> },
    /// One trial after another on the calling thread.
    Sequential,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Parallel { threads: None }
    }
}

/// Outcome of [`Orchestrator::run_all`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Best trial of every engine, or `None` if all its trials failed.
    pub results: BTreeMap<EngineKind, Option<EngineResult>>,

    /// Every failed trial, per engine.
    pub failures: BTreeMap<EngineKind, Vec<RoutingError>>,

    pub stats: BTreeMap<EngineKind, EngineStats>,

    /// Wall-clock time of the whole run.
    pub wall_time: Duration,

    /// Engine that produced the overall best solution.
    pub best_engine: EngineKind,

    /// Lowest-fitness solution over all engines.
    pub best: Solution,
}

impl RunReport {
    pub fn best_fitness(&self) -> f64 {
        self.best.fitness()
    }

    pub fn result(&self, kind: EngineKind) -> Option<&EngineResult> {
        self.results.get(&kind).and_then(Option::as_ref)
    }

    /// Engines that produced at least one solution.
    pub fn succeeded(&self) -> impl Iterator<Item = EngineKind> + '_ {
        self.results
            .iter()
            .filter(|(_, r)| r.is_some())
            .map(|(&k, _)| k)
    }

    /// Sum of all trial times over wall time.
    pub fn speedup(&self) -> f64 {
        let busy: Duration = self.stats.values().map(EngineStats::total_time).sum();
        if self.wall_time.is_zero() {
            1.0
        } else {
            busy.as_secs_f64() / self.wall_time.as_secs_f64()
        }
    }
}

/// One engine trial to run.
struct Task<'s> {
    spec: &'s EngineSpec,
    /// Run-wide task index, unique even when two specs share a kind.
    trial: usize,
    seed: u64,
}

/// Runs engines side by side over the same seeds.
///
/// Every (engine, trial) pair is an independent task with its own derived
/// RNG seed. A failing or panicking trial is recorded and contributes no
/// candidate; the others carry on. Per engine the best trial wins, and the
/// overall best is picked among engines that produced a solution.
///
/// Trials are collected in submission order, so a parallel and a
/// sequential run with the same seed compare the same candidates.
///
/// # Examples
///
/// ```
/// use u_routeswarm::engine::EngineSpec;
/// use u_routeswarm::evaluation::Evaluator;
/// use u_routeswarm::gwo::GwoConfig;
/// use u_routeswarm::instance::Instance;
/// use u_routeswarm::models::{Location, Solution};
/// use u_routeswarm::parallel::{ExecutionMode, Orchestrator};
/// use u_routeswarm::sa::SaConfig;
///
/// let locations = vec![
///     Location::depot(0.0, 0.0),
///     Location::new(1, 3.0, 4.0).with_pickup(2.0, 1.0),
///     Location::new(2, 6.0, 8.0).with_pickup(3.0, 1.0),
///     Location::new(3, 1.0, 7.0).with_pickup(1.0, 1.0),
/// ];
/// let instance = Instance::new(locations, 10.0).unwrap();
/// let seed = Solution::from_index_sequences(&[vec![1, 2], vec![3]], &instance).unwrap();
///
/// let engines = vec![
///     EngineSpec::Sa(SaConfig::default().with_iterations_per_temperature(10)),
///     EngineSpec::Gwo(GwoConfig::default().with_max_iterations(10)),
/// ];
/// let report = Orchestrator::new(Evaluator::new(&instance, Default::default()))
///     .with_mode(ExecutionMode::Sequential)
///     .with_seed(7)
///     .run_all(&engines, &[seed])
///     .unwrap();
/// assert!(report.best.covers_all(instance.num_locations()));
/// ```
pub struct Orchestrator<'a> {
    evaluator: Evaluator<'a>,
    sink: &'a dyn EventSink,
    mode: ExecutionMode,
    trials_per_engine: usize,
    seed: Option<u64>,
    time_limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
    log_interval: usize,
    progress: Arc<RunProgress>,
}

impl<'a> Orchestrator<'a> {
    /// Parallel, one trial per engine, events forwarded to `tracing`.
    pub fn new(evaluator: Evaluator<'a>) -> Self {
        Self {
            evaluator,
            sink: &TRACING_SINK,
            mode: ExecutionMode::default(),
            trials_per_engine: 1,
            seed: None,
            time_limit: None,
            cancel: None,
            log_interval: 100,
            progress: Arc::new(RunProgress::new()),
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn EventSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Independent trials per engine; each uses a different derived seed.
    pub fn with_trials_per_engine(mut self, n: usize) -> Self {
        self.trials_per_engine = n.max(1);
        self
    }

    /// Base seed from which every trial seed is derived.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Wall-clock ceiling for the whole run. Trials still running when it
    /// passes stop at their next iteration and report their best so far.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_log_interval(mut self, n: usize) -> Self {
        self.log_interval = n;
        self
    }

    /// Live counters of the current (or last) run.
    pub fn progress(&self) -> Arc<RunProgress> {
        Arc::clone(&self.progress)
    }

    /// Turns one starting solution into a seed population: the SA current
    /// solution at the end of every temperature level, plus the start.
    pub fn expand_seeds(
        &self,
        start: &Solution,
        config: &SaConfig,
    ) -> Result<Vec<Solution>, RoutingError> {
        let ctx = self.context(0, None);
        let mut seeds = vec![start.clone()];
        seeds.extend(SaRunner::trajectory(&ctx, std::slice::from_ref(start), config)?);
        Ok(seeds)
    }

    /// Runs every engine `trials_per_engine` times over `seeds`.
    ///
    /// Fails before starting anything on an empty seed list or a seed that
    /// does not cover every customer exactly once, and with
    /// [`RoutingError::AllEnginesFailed`] if no trial produced a solution.
    pub fn run_all(
        &self,
        engines: &[EngineSpec],
        seeds: &[Solution],
    ) -> Result<RunReport, RoutingError> {
        validate_seeds(seeds, self.evaluator.instance())?;

        let base_seed = self.seed.unwrap_or_else(rand::random);
        let tasks: Vec<Task<'_>> = engines
            .iter()
            .enumerate()
            .flat_map(|(e, spec)| {
                (0..self.trials_per_engine).map(move |t| {
                    let trial = e * self.trials_per_engine + t;
                    Task {
                        spec,
                        trial,
                        seed: derive_seed(base_seed, trial as u64),
                    }
                })
            })
            .collect();

        info!(
            engines = engines.len(),
            trials = tasks.len(),
            mode = ?self.mode,
            seed = base_seed,
            "Run started"
        );
        self.progress.reset(tasks.len());
        let monitor = Mutex::new(PerformanceMonitor::new());
        let deadline = self.time_limit.map(|d| Instant::now() + d);
        let start = Instant::now();

        let run = |task: &Task<'_>| self.run_trial(task, seeds, deadline, &monitor);
        let outcomes: Vec<Result<EngineResult, RoutingError>> = match self.mode {
            ExecutionMode::Sequential => tasks.iter().map(run).collect(),
            ExecutionMode::Parallel { threads } => {
                let threads = threads.unwrap_or_else(|| {
                    std::thread::available_parallelism().map_or(1, |n| n.get())
                });
                match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                    Ok(pool) => pool.install(|| tasks.par_iter().map(run).collect()),
                    Err(e) => {
                        warn!(error = %e, "Worker pool unavailable, running sequentially");
                        tasks.iter().map(run).collect()
                    }
                }
            }
        };
        let wall_time = start.elapsed();

        let mut results: BTreeMap<EngineKind, Option<EngineResult>> = BTreeMap::new();
        let mut failures: BTreeMap<EngineKind, Vec<RoutingError>> = BTreeMap::new();
        for (task, outcome) in tasks.iter().zip(outcomes) {
            let kind = task.spec.kind();
            let slot = results.entry(kind).or_insert(None);
            match outcome {
                Ok(r) => {
                    if !matches!(slot, Some(b) if b.best_fitness <= r.best_fitness) {
                        *slot = Some(r);
                    }
                }
                Err(e) => failures.entry(kind).or_default().push(e),
            }
        }

        let stats = monitor.into_inner().all_stats();
        for s in stats.values() {
            info!(
                engine = %s.kind,
                trials = s.trials,
                failures = s.failures,
                best_fitness = s.best_fitness.unwrap_or(f64::NAN),
                avg_ms = s.avg_time.as_millis() as u64,
                "Engine summary"
            );
        }

        let (best_engine, best) = results
            .iter()
            .filter_map(|(&k, r)| r.as_ref().map(|r| (k, r)))
            .min_by(|(_, a), (_, b)| a.best_fitness.total_cmp(&b.best_fitness))
            .map(|(k, r)| (k, r.best.clone()))
            .ok_or(RoutingError::AllEnginesFailed)?;

        let report = RunReport {
            results,
            failures,
            stats,
            wall_time,
            best_engine,
            best,
        };
        info!(
            best_engine = %report.best_engine,
            best_fitness = report.best_fitness(),
            wall_ms = wall_time.as_millis() as u64,
            speedup = report.speedup(),
            "Run finished"
        );
        Ok(report)
    }

    fn context(&self, trial: usize, deadline: Option<Instant>) -> SearchContext<'a> {
        let mut ctx = SearchContext::new(self.evaluator)
            .with_sink(self.sink)
            .with_trial(trial)
            .with_log_interval(self.log_interval);
        if let Some(cancel) = &self.cancel {
            ctx = ctx.with_cancel(Arc::clone(cancel));
        }
        if let Some(d) = deadline {
            ctx = ctx.with_deadline(d);
        }
        ctx
    }

    fn run_trial(
        &self,
        task: &Task<'_>,
        seeds: &[Solution],
        deadline: Option<Instant>,
        monitor: &Mutex<PerformanceMonitor>,
    ) -> Result<EngineResult, RoutingError> {
        let kind = task.spec.kind();
        let ctx = self.context(task.trial, deadline);
        let spec = task.spec.with_seed(task.seed);

        ctx.emit(kind, EventKind::TrialStarted);
        let started = Instant::now();
        let outcome = match catch_unwind(AssertUnwindSafe(|| spec.run(&ctx, seeds))) {
            Ok(Ok(r)) => Ok(r),
            Ok(Err(e)) => Err(RoutingError::EngineFailed {
                engine: kind,
                reason: e.to_string(),
            }),
            Err(payload) => Err(RoutingError::EngineFailed {
                engine: kind,
                reason: panic_message(payload.as_ref()),
            }),
        };
        let elapsed = started.elapsed();

        match &outcome {
            Ok(r) => {
                ctx.emit(
                    kind,
                    EventKind::TrialFinished {
                        best_fitness: r.best_fitness,
                        elapsed,
                    },
                );
                let breakdown = self.evaluator.breakdown(&r.best);
                monitor
                    .lock()
                    .record_success(kind, task.trial, elapsed, r.best_fitness, breakdown);
            }
            Err(e) => {
                ctx.emit(
                    kind,
                    EventKind::TrialFailed {
                        reason: e.to_string(),
                    },
                );
                monitor.lock().record_failure(kind, task.trial, elapsed);
            }
        }
        self.progress.finish_trial(kind, outcome.is_err());
        outcome
    }
}

impl std::fmt::Debug for Orchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("mode", &self.mode)
            .field("trials_per_engine", &self.trials_per_engine)
            .field("seed", &self.seed)
            .field("time_limit", &self.time_limit)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aco::AcoConfig;
    use crate::engine::test_support::{line_instance, line_seed};
    use crate::evaluation::FitnessWeights;
    use crate::events::CollectingSink;
    use crate::gwo::GwoConfig;
    use crate::sho::ShoConfig;
    use crate::woa::WoaConfig;

    fn quick_engines() -> Vec<EngineSpec> {
        vec![
            EngineSpec::Sa(SaConfig::default().with_iterations_per_temperature(10)),
            EngineSpec::Aco(AcoConfig::default().with_colony_size(5).with_max_iterations(5)),
            EngineSpec::Gwo(GwoConfig::default().with_population_size(5).with_max_iterations(5)),
            EngineSpec::Woa(WoaConfig::default().with_population_size(5).with_max_iterations(5)),
            EngineSpec::Sho(ShoConfig::default().with_population_size(5).with_max_iterations(10)),
        ]
    }

    #[test]
    fn test_run_all_reports_every_engine() {
        let inst = line_instance(10, 20.0);
        let eval = Evaluator::new(&inst, FitnessWeights::default());
        let seed = line_seed(&inst, 3);
        let seed_fitness = eval.fitness(&seed);
        let orch = Orchestrator::new(eval)
            .with_sink(&crate::events::NullSink)
            .with_mode(ExecutionMode::Parallel { threads: Some(2) })
            .with_trials_per_engine(2)
            .with_seed(3);
        let report = orch.run_all(&quick_engines(), &[seed]).expect("run");

        assert_eq!(report.results.len(), 5);
        assert_eq!(report.succeeded().count(), 5);
        assert!(report.failures.is_empty());
        assert!(report.best_fitness() <= seed_fitness);
        for kind in EngineKind::ALL {
            let r = report.result(kind).expect("result");
            assert!(r.best_fitness >= report.best_fitness());
            assert_eq!(report.stats[&kind].trials, 2);
        }
        assert_eq!(orch.progress().total_completed(), 10);
        assert_eq!(orch.progress().planned(), 10);
        assert!(report.speedup() > 0.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let inst = line_instance(10, 20.0);
        let eval = Evaluator::new(&inst, FitnessWeights::default());
        let seeds = [line_seed(&inst, 3)];
        let run = |mode| {
            Orchestrator::new(eval)
                .with_sink(&crate::events::NullSink)
                .with_mode(mode)
                .with_trials_per_engine(2)
                .with_seed(11)
                .run_all(&quick_engines(), &seeds)
                .expect("run")
        };
        let seq = run(ExecutionMode::Sequential);
        let par = run(ExecutionMode::Parallel { threads: Some(4) });
        assert_eq!(seq.best_engine, par.best_engine);
        assert_eq!(seq.best.index_sequences(), par.best.index_sequences());
        for kind in EngineKind::ALL {
            assert_eq!(seq.stats[&kind].trial_fitness, par.stats[&kind].trial_fitness);
        }
    }

    #[test]
    fn test_same_kind_specs_keep_distinct_trials() {
        let inst = line_instance(10, 20.0);
        let eval = Evaluator::new(&inst, FitnessWeights::default());
        let seeds = [line_seed(&inst, 3)];
        let engines = vec![
            EngineSpec::Sa(SaConfig::default().with_iterations_per_temperature(10)),
            EngineSpec::Sa(
                SaConfig::default()
                    .with_initial_temperature(5.0)
                    .with_iterations_per_temperature(20),
            ),
        ];
        let sink = CollectingSink::new();
        let seq = Orchestrator::new(eval)
            .with_sink(&sink)
            .with_mode(ExecutionMode::Sequential)
            .with_trials_per_engine(2)
            .with_seed(5)
            .run_all(&engines, &seeds)
            .expect("run");
        let par = Orchestrator::new(eval)
            .with_sink(&crate::events::NullSink)
            .with_mode(ExecutionMode::Parallel { threads: Some(4) })
            .with_trials_per_engine(2)
            .with_seed(5)
            .run_all(&engines, &seeds)
            .expect("run");

        let kind = EngineKind::SimulatedAnnealing;
        assert_eq!(seq.stats[&kind].trials, 4);
        assert_eq!(seq.stats[&kind].trial_fitness.len(), 4);
        assert_eq!(seq.stats[&kind].trial_fitness, par.stats[&kind].trial_fitness);
        let best = seq.stats[&kind].best_fitness.expect("best");
        assert_eq!(seq.result(kind).expect("result").best_fitness, best);

        let mut trials: Vec<usize> = sink.events().iter().map(|e| e.trial).collect();
        trials.sort_unstable();
        trials.dedup();
        assert_eq!(trials, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_failing_engine_is_isolated() {
        let inst = line_instance(8, 20.0);
        let sink = CollectingSink::new();
        let engines = vec![
            EngineSpec::Sa(SaConfig::default().with_iterations_per_temperature(10)),
            EngineSpec::Aco(AcoConfig::default().with_colony_size(0)),
        ];
        let orch = Orchestrator::new(Evaluator::new(&inst, FitnessWeights::default()))
            .with_sink(&sink)
            .with_mode(ExecutionMode::Sequential)
            .with_seed(1);
        let report = orch.run_all(&engines, &[line_seed(&inst, 2)]).expect("run");

        assert_eq!(report.best_engine, EngineKind::SimulatedAnnealing);
        assert!(report.result(EngineKind::AntColony).is_none());
        assert!(matches!(
            report.failures[&EngineKind::AntColony][0],
            RoutingError::EngineFailed {
                engine: EngineKind::AntColony,
                ..
            }
        ));
        assert_eq!(report.stats[&EngineKind::AntColony].failures, 1);
        assert_eq!(orch.progress().failed(), 1);
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::TrialFailed { .. })));
    }

    #[test]
    fn test_all_engines_failed() {
        let inst = line_instance(6, 20.0);
        let orch = Orchestrator::new(Evaluator::new(&inst, FitnessWeights::default()))
            .with_sink(&crate::events::NullSink)
            .with_mode(ExecutionMode::Sequential);
        let engines = vec![EngineSpec::Gwo(GwoConfig::default().with_population_size(0))];
        assert_eq!(
            orch.run_all(&engines, &[line_seed(&inst, 2)]).unwrap_err(),
            RoutingError::AllEnginesFailed
        );
        assert_eq!(
            orch.run_all(&[], &[line_seed(&inst, 2)]).unwrap_err(),
            RoutingError::AllEnginesFailed
        );
    }

    #[test]
    fn test_degenerate_seeds_rejected_before_start() {
        let inst = line_instance(6, 20.0);
        let sink = CollectingSink::new();
        let orch = Orchestrator::new(Evaluator::new(&inst, FitnessWeights::default()))
            .with_sink(&sink)
            .with_mode(ExecutionMode::Sequential);
        assert_eq!(
            orch.run_all(&quick_engines(), &[]).unwrap_err(),
            RoutingError::NoVehicles
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_expand_seeds_from_sa_trajectory() {
        let inst = line_instance(8, 20.0);
        let orch = Orchestrator::new(Evaluator::new(&inst, FitnessWeights::default()))
            .with_sink(&crate::events::NullSink);
        let start = line_seed(&inst, 2);
        let sa = SaConfig::default()
            .with_initial_temperature(10.0)
            .with_min_temperature(5.0)
            .with_iterations_per_temperature(5)
            .with_seed(4);
        let seeds = orch.expand_seeds(&start, &sa).expect("seeds");
        // 10 * 0.95^k <= 5 after 14 levels
        assert_eq!(seeds.len(), 15);
        assert!(seeds.iter().all(|s| s.covers_all(inst.num_locations())));
    }

    #[test]
    fn test_panic_message() {
        let p: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(p.as_ref()), "panicked: boom");
        let p: Box<dyn std::any::Any + Send> = Box::new(String::from("bad"));
        assert_eq!(panic_message(p.as_ref()), "panicked: bad");
        let p: Box<dyn std::any::Any + Send> = Box::new(3_u8);
        assert_eq!(panic_message(p.as_ref()), "panicked");
    }
}
