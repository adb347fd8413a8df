//! Minimal boolean test runner.
//!
//! Tests are registered explicitly and share a context value. A run always
//! starts with a sequential pass; a seeded random-order pass follows only
//! when every test passed sequentially.

use std::panic::{self, AssertUnwindSafe};

use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::error::{BenchError, Result};
use crate::format::Status;

type TestFn<C> = Box<dyn Fn(&C) -> bool>;

struct TestCase<C> {
    description: String,
    func: TestFn<C>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Sequential,
    Random { seed: u64 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SuiteState {
    #[default]
    NotRun,
    SequentialPassed,
    SequentialFailed,
    RandomPassed,
    RandomFailed,
}

impl SuiteState {
    pub fn passed(&self) -> bool {
        matches!(self, SuiteState::SequentialPassed | SuiteState::RandomPassed)
    }
}

/// Outcome of one phase over all tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseSummary {
    pub passed: usize,
    pub total: usize,
    /// Descriptions in execution order.
    pub executed: Vec<String>,
}

impl PhaseSummary {
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total as f64 * 100.0
    }
}

pub struct TestSuite<C = ()> {
    context: C,
    tests: Vec<TestCase<C>>,
    state: SuiteState,
    color: bool,
    output: Vec<String>,
    phases: Vec<PhaseSummary>,
}

impl<C> TestSuite<C> {
    pub fn new(context: C) -> Self {
        Self {
            context,
            tests: Vec::new(),
            state: SuiteState::NotRun,
            color: true,
            output: Vec::new(),
            phases: Vec::new(),
        }
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn add<F>(&mut self, description: impl Into<String>, test: F) -> &mut Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.tests.push(TestCase {
            description: description.into(),
            func: Box::new(test),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn state(&self) -> SuiteState {
        self.state
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Lines printed by the last run, without trailing newlines.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Phase summaries of the last run, sequential first.
    pub fn phases(&self) -> &[PhaseSummary] {
        &self.phases
    }

    /// Run the suite and print progress to stdout.
    pub fn run(&mut self, order: Order) -> Result<SuiteState> {
        if self.tests.is_empty() {
            return Err(BenchError::EmptySuite);
        }
        self.output.clear();
        self.phases.clear();
        self.state = SuiteState::NotRun;

        self.emit(String::new());
        self.emit(Status::Warn.decorate("SEQUENTIAL TEST RUN", self.color));
        self.emit(String::new());
        let sequential: Vec<usize> = (0..self.tests.len()).collect();
        let summary = self.run_phase(&sequential);
        self.state = if summary.all_passed() {
            SuiteState::SequentialPassed
        } else {
            SuiteState::SequentialFailed
        };
        info!(passed = summary.passed, total = summary.total, "sequential phase finished");

        if let Order::Random { seed } = order {
            if self.state == SuiteState::SequentialPassed {
                self.emit(Status::Warn.decorate("RANDOM ORDER TEST RUN", self.color));
                self.emit(String::new());
                let mut shuffled = sequential;
                shuffled.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
                let summary = self.run_phase(&shuffled);
                self.state = if summary.all_passed() {
                    SuiteState::RandomPassed
                } else {
                    SuiteState::RandomFailed
                };
                info!(
                    passed = summary.passed,
                    total = summary.total,
                    seed,
                    "random phase finished"
                );
            } else {
                self.emit(Status::Warn.decorate(
                    "TESTS MUST PASS IN SEQUENTIAL ORDER FIRST",
                    self.color,
                ));
                self.emit(String::new());
            }
        }

        Ok(self.state)
    }

    fn run_phase(&mut self, order: &[usize]) -> PhaseSummary {
        let mut summary = PhaseSummary {
            passed: 0,
            total: order.len(),
            executed: Vec::with_capacity(order.len()),
        };

        for &i in order {
            let test = &self.tests[i];
            let ctx = &self.context;
            let passed = panic::catch_unwind(AssertUnwindSafe(|| (test.func)(ctx)))
                .unwrap_or(false);
            debug!(test = %test.description, passed, "test finished");

            let label = if passed {
                Status::Ok.decorate("PASS", self.color)
            } else {
                Status::Fail.decorate("FAIL", self.color)
            };
            let line = format!("{}\t{}", label, test.description);
            summary.executed.push(test.description.clone());
            if passed {
                summary.passed += 1;
            }
            self.emit(line);
        }

        self.emit(String::new());
        self.emit(format!(
            "{} OF {} ({:.2}%) TESTS PASSED",
            summary.passed,
            summary.total,
            summary.percent()
        ));
        self.emit(String::new());
        self.phases.push(summary.clone());
        summary
    }

    fn emit(&mut self, line: String) {
        println!("{line}");
        self.output.push(line);
    }
}
