//! Single-candidate execution.
//!
//! One call to [`measure`] is one isolated unit of work: it owns its copy of
//! the arguments, runs the whole iteration loop and turns panics into a
//! [`CandidateFault`] so nothing escapes into the harness.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::candidate::Candidate;
use crate::error::CandidateFault;
use crate::sample::TimingSample;

/// Call `candidate` `warmup_iters` times untimed, then `iters` times timed.
/// Returns one duration in seconds per timed call.
pub fn measure_durations<A>(
    candidate: &Candidate<A>,
    iters: u64,
    warmup_iters: u64,
    args: &A,
) -> Result<Vec<f64>, CandidateFault> {
    for _ in 0..warmup_iters {
        candidate.call(args)?;
    }

    let mut durations = Vec::with_capacity(iters as usize);
    for _ in 0..iters {
        let start = Instant::now();
        let outcome = candidate.call(args);
        let elapsed = start.elapsed();
        outcome?;
        durations.push(elapsed.as_secs_f64());
    }
    Ok(durations)
}

/// Measure one candidate. A panic inside the candidate is caught and reported
/// as a fault.
pub fn measure<A>(
    candidate: &Candidate<A>,
    iters: u64,
    warmup_iters: u64,
    args: &A,
) -> Result<TimingSample, CandidateFault> {
    let durations = panic::catch_unwind(AssertUnwindSafe(|| {
        measure_durations(candidate, iters, warmup_iters, args)
    }))
    .map_err(CandidateFault::from_panic)??;

    TimingSample::from_durations(candidate.index(), candidate.name(), &durations)
        .ok_or_else(|| CandidateFault::new("no iterations were measured"))
}
