//! Candidate registration and parallel dispatch.
//!
//! Every registered candidate is measured as its own rayon job with a private
//! clone of the run arguments. The run waits for all jobs, then ranks the
//! samples by mean.

use std::fmt::Display;
use std::io::{self, Write};
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, error, info};

use crate::candidate::{derive_name, Candidate};
use crate::config::HarnessConfig;
use crate::error::{BenchError, CandidateFault, Result};
use crate::report::RunReport;
use crate::sample::TimingSample;
use crate::worker;

/// Comparative benchmark over a set of candidates that all take `&A`.
///
/// Use `()` for candidates without arguments and a tuple for several.
pub struct Harness<A = ()> {
    config: HarnessConfig,
    candidates: Vec<Candidate<A>>,
}

impl<A> Default for Harness<A> {
    fn default() -> Self {
        Self {
            config: HarnessConfig::default(),
            candidates: Vec::new(),
        }
    }
}

impl<A> Harness<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            candidates: Vec::new(),
        })
    }

    /// Validate and store iteration count and display unit. On error the
    /// previous configuration is kept.
    pub fn configure(&mut self, iterations: i64, unit: &str) -> Result<&mut Self> {
        let parsed = HarnessConfig::parse(iterations, unit)?;
        self.config.iterations = parsed.iterations;
        self.config.unit = parsed.unit;
        Ok(self)
    }

    pub fn set_config(&mut self, config: HarnessConfig) -> Result<&mut Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn candidates(&self) -> &[Candidate<A>] {
        &self.candidates
    }

    /// Register a candidate named after its function.
    pub fn register<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        let index = self.candidates.len();
        let name = derive_name::<F>(index);
        self.candidates.push(Candidate::new(index, name, f));
        self
    }

    pub fn register_named<F, R>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        let index = self.candidates.len();
        self.candidates.push(Candidate::new(index, name, f));
        self
    }

    /// Register a candidate whose `Err` fails the run.
    pub fn try_register<F, T, E>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&A) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Display,
    {
        let index = self.candidates.len();
        let name = derive_name::<F>(index);
        self.candidates.push(Candidate::fallible(index, name, f));
        self
    }

    pub fn try_register_named<F, T, E>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&A) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Display,
    {
        let index = self.candidates.len();
        self.candidates.push(Candidate::fallible(index, name, f));
        self
    }
}

impl<A: Clone + Send + Sync> Harness<A> {
    /// Measure every candidate, print the ranked report to stdout and return it.
    pub fn run(&self, args: A) -> Result<RunReport> {
        self.run_to(args, &mut io::stdout().lock())
    }

    /// Like [`Harness::run`], writing the rendered report to `out`. Nothing is
    /// written when the run fails.
    pub fn run_to<W: Write>(&self, args: A, out: &mut W) -> Result<RunReport> {
        let report = self.collect(args)?;
        out.write_all(report.render().as_bytes())
            .and_then(|()| out.flush())
            .map_err(BenchError::Output)?;
        Ok(report)
    }

    /// Measure every candidate and return the ranked report without printing.
    pub fn collect(&self, args: A) -> Result<RunReport> {
        if self.candidates.is_empty() {
            return Err(BenchError::EmptyCandidateSet);
        }

        info!(
            candidates = self.candidates.len(),
            iterations = self.config.iterations,
            unit = %self.config.unit,
            "starting benchmark run"
        );
        let start = Instant::now();

        let outcomes = match self.config.workers {
            Some(threads) => {
                let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
                pool.install(|| self.dispatch(&args))
            }
            None => self.dispatch(&args),
        };

        let mut samples = Vec::with_capacity(outcomes.len());
        let mut failure: Option<(&Candidate<A>, CandidateFault)> = None;
        for (candidate, outcome) in outcomes {
            match outcome {
                Ok(sample) => samples.push(sample),
                Err(fault) => {
                    error!(
                        index = candidate.index(),
                        name = candidate.name(),
                        "candidate failed: {}",
                        fault
                    );
                    let lower = failure
                        .as_ref()
                        .map_or(true, |(first, _)| candidate.index() < first.index());
                    if lower {
                        failure = Some((candidate, fault));
                    }
                }
            }
        }

        if let Some((candidate, source)) = failure {
            return Err(BenchError::CandidateExecutionFailed {
                index: candidate.index(),
                name: candidate.name().to_string(),
                source,
            });
        }

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "benchmark run complete"
        );
        Ok(RunReport::new(self.config.clone(), samples))
    }

    /// One job per candidate; returns once every job has finished.
    fn dispatch(
        &self,
        args: &A,
    ) -> Vec<(&Candidate<A>, std::result::Result<TimingSample, CandidateFault>)> {
        let iters = self.config.iterations;
        let warmup = self.config.warmup_iterations;

        self.candidates
            .par_iter()
            .with_max_len(1)
            .map(|candidate| {
                debug!(
                    index = candidate.index(),
                    name = candidate.name(),
                    "worker started"
                );
                let local = args.clone();
                let outcome = worker::measure(candidate, iters, warmup, &local);
                (candidate, outcome)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Unit;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn sleep_ms(ms: u64) -> impl Fn(&()) + Send + Sync + 'static {
        move |_| std::thread::sleep(Duration::from_millis(ms))
    }

    fn names(report: &RunReport) -> Vec<&str> {
        report
            .samples()
            .iter()
            .map(|s| s.candidate_name.as_str())
            .collect()
    }

    fn quiet(iterations: u64) -> HarnessConfig {
        HarnessConfig::new(iterations, Unit::Milliseconds)
            .unwrap()
            .no_color()
    }

    fn sum_loop(v: &Vec<u64>) -> u64 {
        let mut acc = 0;
        for x in v {
            acc += x;
        }
        acc
    }

    #[test]
    fn test_empty_candidate_set() {
        let h: Harness<()> = Harness::new();
        assert!(matches!(h.run(()), Err(BenchError::EmptyCandidateSet)));

        let mut h: Harness<()> = Harness::new();
        h.configure(1, "ns").unwrap();
        assert!(matches!(h.collect(()), Err(BenchError::EmptyCandidateSet)));
    }

    #[test]
    fn test_reusable_after_empty_error() {
        let mut h: Harness<()> = Harness::with_config(quiet(3)).unwrap();
        assert!(h.collect(()).is_err());

        h.register_named("noop", |_| ());
        let report = h.collect(()).unwrap();
        assert_eq!(report.samples().len(), 1);
    }

    #[test]
    fn test_configure_validation() {
        let mut h: Harness<()> = Harness::new();
        assert!(matches!(h.configure(0, "ms"), Err(BenchError::InvalidConfiguration(_))));
        assert!(matches!(h.configure(-5, "ms"), Err(BenchError::InvalidConfiguration(_))));
        assert!(matches!(h.configure(10, "hours"), Err(BenchError::InvalidConfiguration(_))));
        assert_eq!(h.config().iterations, 100);

        h.configure(1, "ns").unwrap();
        assert_eq!(h.config().iterations, 1);
        assert_eq!(h.config().unit, Unit::Nanoseconds);
    }

    #[test]
    fn test_register_chains_and_names() {
        let mut h: Harness<Vec<u64>> = Harness::new();
        h.register(sum_loop)
            .register(sum_loop)
            .register(|v: &Vec<u64>| v.iter().sum::<u64>());

        let names: Vec<_> = h.candidates().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["sum_loop", "sum_loop", "closure#2"]);
        let indices: Vec<_> = h.candidates().iter().map(|c| c.index()).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn test_duplicate_registration_measured_twice() {
        let mut h: Harness<Vec<u64>> = Harness::with_config(quiet(5)).unwrap();
        h.register(sum_loop).register(sum_loop);

        let report = h.collect((0..100).collect()).unwrap();
        let mut indices: Vec<_> = report.samples().iter().map(|s| s.candidate_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, [0, 1]);
    }

    #[test]
    fn test_args_forwarded_to_every_candidate() {
        let seen = Arc::new(AtomicUsize::new(0));
        let mut h: Harness<(u64, String)> = Harness::with_config(quiet(4)).unwrap();
        for name in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            h.register_named(name, move |(n, s): &(u64, String)| {
                assert_eq!(*n, 42);
                assert_eq!(s, "payload");
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        h.collect((42, "payload".to_string())).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_invariants_hold_for_every_sample() {
        let mut h: Harness<Vec<u64>> = Harness::with_config(quiet(25)).unwrap();
        h.register(sum_loop)
            .register_named("iter_sum", |v: &Vec<u64>| v.iter().sum::<u64>())
            .register_named("fold", |v: &Vec<u64>| v.iter().fold(0u64, |a, b| a + b));

        let report = h.collect((0..10_000).collect()).unwrap();
        assert_eq!(report.samples().len(), 3);
        for s in report.samples() {
            assert_eq!(s.iterations, 25);
            assert!(s.min_seconds <= s.mean_seconds && s.mean_seconds <= s.max_seconds);
        }
        let means: Vec<_> = report.samples().iter().map(|s| s.mean_seconds).collect();
        assert!(means.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_fast_candidate_ranks_first() {
        let mut h: Harness<()> = Harness::new();
        h.configure(10, "ms").unwrap();
        h.register_named("five_ms", sleep_ms(5))
            .register_named("one_ms", sleep_ms(1));

        let report = h.run(()).unwrap();
        assert_eq!(names(&report), ["one_ms", "five_ms"]);

        let fastest = report.fastest().unwrap();
        assert!(fastest.mean_seconds >= 0.001);
        assert!(fastest.mean_seconds < 0.004);

        let slowdown = report.slowdown(&report.samples()[1]);
        assert!(slowdown > 2.5 && slowdown < 6.0, "slowdown was {slowdown}");
    }

    #[test]
    fn test_three_way_ordering_and_multiplier() {
        let mut h: Harness<()> = Harness::with_config(quiet(4)).unwrap();
        h.register_named("c", sleep_ms(12))
            .register_named("a", sleep_ms(1))
            .register_named("b", sleep_ms(5));

        let report = h.collect(()).unwrap();
        assert_eq!(names(&report), ["a", "b", "c"]);

        let a = &report.samples()[0];
        let c = &report.samples()[2];
        let expected = crate::report::round2(c.mean_seconds / a.mean_seconds);
        assert_eq!(report.slowdown(c), expected);
    }

    #[test]
    fn test_registration_order_does_not_leak() {
        let order = |forward: bool| {
            let mut h: Harness<()> = Harness::with_config(quiet(3)).unwrap();
            let mut entries = vec![("x", 1), ("y", 5), ("z", 10)];
            if !forward {
                entries.reverse();
            }
            for (name, ms) in entries {
                h.register_named(name, sleep_ms(ms));
            }
            let report = h.collect(()).unwrap();
            names(&report).into_iter().map(String::from).collect::<Vec<_>>()
        };

        assert_eq!(order(true), order(false));
        assert_eq!(order(true), ["x", "y", "z"]);
    }

    #[test]
    fn test_panicking_candidate_fails_run() {
        let finished = Arc::new(AtomicUsize::new(0));
        let done = Arc::clone(&finished);

        let mut h: Harness<()> = Harness::with_config(quiet(3)).unwrap();
        h.register_named("steady", move |_| {
            std::thread::sleep(Duration::from_millis(2));
            done.fetch_add(1, Ordering::SeqCst);
        })
        .register_named("explode", |_: &()| -> u32 { panic!("unconditional failure") });

        let mut rendered = Vec::new();
        match h.run_to((), &mut rendered) {
            Err(BenchError::CandidateExecutionFailed {
                index,
                name,
                source,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(name, "explode");
                assert_eq!(source.message, "unconditional failure");
            }
            other => panic!("expected CandidateExecutionFailed, got {other:?}"),
        }
        assert!(rendered.is_empty(), "no report may be written for a failed run");
        // The healthy candidate still ran to completion.
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_successful_run_writes_report() {
        let mut h: Harness<()> = Harness::with_config(quiet(2)).unwrap();
        h.register_named("noop", |_| ());

        let mut rendered = Vec::new();
        let report = h.run_to((), &mut rendered).unwrap();
        let text = String::from_utf8(rendered).unwrap();
        assert_eq!(text, report.render());
        assert!(text.contains("Test: noop |"));
    }

    #[test]
    fn test_lowest_index_failure_reported() {
        let mut h: Harness<()> = Harness::with_config(quiet(2)).unwrap();
        h.register_named("ok", |_| ())
            .try_register_named("bad_a", |_| Err::<(), _>("first"))
            .try_register_named("bad_b", |_| Err::<(), _>("second"));

        match h.collect(()) {
            Err(BenchError::CandidateExecutionFailed { index, name, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(name, "bad_a");
            }
            other => panic!("expected CandidateExecutionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_dedicated_worker_pool() {
        let config = quiet(5).with_workers(2).unwrap();
        let mut h: Harness<()> = Harness::with_config(config).unwrap();
        for i in 0..6 {
            h.register_named(format!("job{i}"), |_| ());
        }

        let report = h.collect(()).unwrap();
        assert_eq!(report.samples().len(), 6);
    }

    #[test]
    fn test_run_reports_configured_unit() {
        let mut h: Harness<()> = Harness::new();
        h.configure(2, "us").unwrap();
        h.register_named("noop", |_| ());

        let report = h.collect(()).unwrap();
        assert_eq!(report.config().unit, Unit::Microseconds);
        assert!(report.render().contains(" us |"));
    }
}
