use crate::config::Unit;

/// Summary of one candidate's timed iterations. Seconds are canonical; other
/// units are derived on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingSample {
    pub candidate_index: usize,
    pub candidate_name: String,
    pub iterations: u64,
    pub mean_seconds: f64,
    pub max_seconds: f64,
    pub min_seconds: f64,
}

impl TimingSample {
    /// Reduce per-iteration durations (seconds). Returns `None` for an empty set.
    pub fn from_durations(
        candidate_index: usize,
        candidate_name: impl Into<String>,
        durations: &[f64],
    ) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &d in durations {
            min = min.min(d);
            max = max.max(d);
            sum += d;
        }
        // Summation error can push the mean a few ulps past the extrema.
        let mean = (sum / durations.len() as f64).clamp(min, max);

        Some(Self {
            candidate_index,
            candidate_name: candidate_name.into(),
            iterations: durations.len() as u64,
            mean_seconds: mean,
            max_seconds: max,
            min_seconds: min,
        })
    }

    pub fn mean(&self, unit: Unit) -> f64 {
        unit.scale(self.mean_seconds)
    }

    pub fn max(&self, unit: Unit) -> f64 {
        unit.scale(self.max_seconds)
    }

    pub fn min(&self, unit: Unit) -> f64 {
        unit.scale(self.min_seconds)
    }
}
