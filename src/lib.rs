//! Comparative micro-benchmarks.
//!
//! Register a few implementations of the same thing, run them with shared
//! arguments, and get a table ranked by mean latency plus how many times
//! slower each one is than the fastest.
//!
//! ```no_run
//! use funcbench::Harness;
//!
//! fn sum_iter(v: &Vec<u64>) -> u64 {
//!     v.iter().sum()
//! }
//!
//! fn sum_fold(v: &Vec<u64>) -> u64 {
//!     v.iter().fold(0, |a, b| a + b)
//! }
//!
//! let mut bench: Harness<Vec<u64>> = Harness::new();
//! bench.configure(100, "us")?;
//! bench.register(sum_iter).register(sum_fold);
//! bench.run((0..10_000).collect())?;
//! # Ok::<(), funcbench::BenchError>(())
//! ```

pub mod candidate;
pub mod config;
pub mod error;
pub mod format;
pub mod harness;
pub mod logging;
pub mod report;
pub mod sample;
pub mod schema;
pub mod suite;
pub mod worker;

pub use candidate::Candidate;
pub use config::{HarnessConfig, Unit};
pub use error::{BenchError, CandidateFault};
pub use harness::Harness;
pub use report::RunReport;
pub use sample::TimingSample;
pub use suite::{Order, SuiteState, TestSuite};
