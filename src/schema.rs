use serde::{Deserialize, Serialize};

use crate::config::HarnessConfig;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub iterations: u64,
    pub warmup_iterations: u64,
    pub unit: String,
    pub os: String,
    pub arch: String,
    pub timestamp_utc: String,
}

impl RunMeta {
    pub fn current(config: &HarnessConfig) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            iterations: config.iterations,
            warmup_iterations: config.warmup_iterations,
            unit: config.unit.as_str().to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            timestamp_utc: now_unix(),
        }
    }
}

fn now_unix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

/// One ranked sample. `mean`/`max`/`min` are in the run's display unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub rank: usize,
    pub index: usize,
    pub name: String,
    pub iterations: u64,

    pub mean: f64,
    pub max: f64,
    pub min: f64,

    pub mean_seconds: f64,
    pub slowdown: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReportDocument {
    pub run: RunMeta,
    pub samples: Vec<SampleRecord>,
}
