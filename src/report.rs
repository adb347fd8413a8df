//! Ranked run report and its text rendering.

use std::fmt::Write as _;

use crate::config::HarnessConfig;
use crate::error::Result;
use crate::format::Status;
use crate::sample::TimingSample;
use crate::schema::{BenchReportDocument, RunMeta, SampleRecord};

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The result of one run: samples ordered by mean, fastest first.
#[derive(Clone, Debug)]
pub struct RunReport {
    config: HarnessConfig,
    samples: Vec<TimingSample>,
}

impl RunReport {
    /// Sorts `samples` ascending by mean. Ties keep registration order no
    /// matter what order the samples arrived in.
    pub fn new(config: HarnessConfig, mut samples: Vec<TimingSample>) -> Self {
        samples.sort_by_key(|s| s.candidate_index);
        samples.sort_by(|a, b| a.mean_seconds.total_cmp(&b.mean_seconds));
        Self { config, samples }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    pub fn fastest(&self) -> Option<&TimingSample> {
        self.samples.first()
    }

    pub fn baseline_seconds(&self) -> Option<f64> {
        self.fastest().map(|s| s.mean_seconds)
    }

    /// `sample.mean / fastest.mean`, rounded to two decimals.
    pub fn slowdown(&self, sample: &TimingSample) -> f64 {
        let Some(baseline) = self.baseline_seconds() else {
            return 1.0;
        };
        if baseline > 0.0 {
            round2(sample.mean_seconds / baseline)
        } else if sample.mean_seconds > 0.0 {
            f64::INFINITY
        } else {
            1.0
        }
    }

    pub fn slowdowns(&self) -> Vec<(&str, f64)> {
        self.samples
            .iter()
            .map(|s| (s.candidate_name.as_str(), self.slowdown(s)))
            .collect()
    }

    pub fn render(&self) -> String {
        let unit = self.config.unit;
        let mut out = String::new();

        out.push('\n');
        if self.config.system_info {
            let _ = writeln!(
                out,
                "System:     {} {}",
                std::env::consts::OS,
                std::env::consts::ARCH
            );
        }
        let _ = writeln!(out, "Iterations: {}", self.config.iterations);
        out.push('\n');

        let name_w = self
            .samples
            .iter()
            .map(|s| s.candidate_name.chars().count())
            .max()
            .unwrap_or(0);
        let column_w = |value: fn(&TimingSample) -> f64| {
            self.samples
                .iter()
                .map(|s| format!("{:.3}", unit.scale(value(s))).len())
                .max()
                .unwrap_or(0)
        };
        let mean_w = column_w(|s| s.mean_seconds);
        let max_w = column_w(|s| s.max_seconds);
        let min_w = column_w(|s| s.min_seconds);

        for s in &self.samples {
            let _ = writeln!(
                out,
                "Test: {:<name_w$} | Avg: {:<mean_w$.3} {unit} | Max: {:<max_w$.3} {unit} | Min: {:<min_w$.3} {unit}",
                s.candidate_name,
                s.mean(unit),
                s.max(unit),
                s.min(unit),
            );
        }

        out.push('\n');
        for (rank, s) in self.samples.iter().enumerate() {
            let line = format!("x{:<7} {}", format!("{:.2}", self.slowdown(s)), s.candidate_name);
            let status = if rank == 0 { Status::Ok } else { Status::Fail };
            let _ = writeln!(out, "{}", status.decorate(&line, self.config.color));
        }
        out.push('\n');

        out
    }

    pub fn to_document(&self) -> BenchReportDocument {
        let unit = self.config.unit;
        BenchReportDocument {
            run: RunMeta::current(&self.config),
            samples: self
                .samples
                .iter()
                .enumerate()
                .map(|(rank, s)| SampleRecord {
                    rank,
                    index: s.candidate_index,
                    name: s.candidate_name.clone(),
                    iterations: s.iterations,
                    mean: s.mean(unit),
                    max: s.max(unit),
                    min: s.min(unit),
                    mean_seconds: s.mean_seconds,
                    slowdown: self.slowdown(s),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }
}
