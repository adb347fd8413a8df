use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

pub const DEFAULT_ITERATIONS: u64 = 100;

/// Unit the report is displayed in. Samples are always stored in seconds.
///
/// Every textual form (CLI, JSON, [`FromStr`]) accepts the same names,
/// case-insensitively.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    #[value(name = "sec", alias = "s", alias = "seconds")]
    Seconds,
    #[default]
    #[value(name = "ms", alias = "milliseconds")]
    Milliseconds,
    #[value(name = "us", alias = "µs", alias = "microseconds")]
    Microseconds,
    #[value(name = "ns", alias = "nanoseconds")]
    Nanoseconds,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Seconds => "sec",
            Unit::Milliseconds => "ms",
            Unit::Microseconds => "us",
            Unit::Nanoseconds => "ns",
        }
    }

    /// Multiplier from seconds to this unit.
    pub fn per_second(&self) -> f64 {
        match self {
            Unit::Seconds => 1.0,
            Unit::Milliseconds => 1_000.0,
            Unit::Microseconds => 1_000_000.0,
            Unit::Nanoseconds => 1_000_000_000.0,
        }
    }

    pub fn scale(&self, seconds: f64) -> f64 {
        seconds * self.per_second()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sec" | "s" | "seconds" => Ok(Unit::Seconds),
            "ms" | "milliseconds" => Ok(Unit::Milliseconds),
            "us" | "µs" | "microseconds" => Ok(Unit::Microseconds),
            "ns" | "nanoseconds" => Ok(Unit::Nanoseconds),
            other => Err(BenchError::InvalidConfiguration(format!(
                "unknown unit `{other}` (sec|ms|us|ns)"
            ))),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = BenchError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HarnessConfig {
    pub iterations: u64,
    pub unit: Unit,
    /// Untimed calls made before measuring.
    pub warmup_iterations: u64,
    /// Size of a dedicated worker pool. `None` runs on the global rayon pool.
    pub workers: Option<usize>,
    pub color: bool,
    /// Print the `System:` line above the table.
    pub system_info: bool,
}

/// JSON form of [`HarnessConfig`] before validation. Iterations and unit are
/// kept loosely typed so bad values surface as `InvalidConfiguration`.
#[derive(Deserialize)]
#[serde(default)]
struct RawConfig {
    iterations: i64,
    unit: String,
    warmup_iterations: u64,
    workers: Option<usize>,
    color: bool,
    system_info: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        let cfg = HarnessConfig::default();
        Self {
            iterations: cfg.iterations as i64,
            unit: cfg.unit.into(),
            warmup_iterations: cfg.warmup_iterations,
            workers: cfg.workers,
            color: cfg.color,
            system_info: cfg.system_info,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            unit: Unit::default(),
            warmup_iterations: 0,
            workers: None,
            color: true,
            system_info: true,
        }
    }
}

impl HarnessConfig {
    pub fn new(iterations: u64, unit: Unit) -> Result<Self> {
        let cfg = Self {
            iterations,
            unit,
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build a configuration from loosely typed input, e.g. user-supplied
    /// values that may be negative or name an unknown unit.
    pub fn parse(iterations: i64, unit: &str) -> Result<Self> {
        if iterations <= 0 {
            return Err(BenchError::InvalidConfiguration(format!(
                "iterations must be greater than 0, got {iterations}"
            )));
        }
        Self::new(iterations as u64, unit.parse()?)
    }

    pub fn with_warmup(mut self, warmup_iterations: u64) -> Self {
        self.warmup_iterations = warmup_iterations;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self> {
        self.workers = Some(workers);
        self.validate()?;
        Ok(self)
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn without_system_info(mut self) -> Self {
        self.system_info = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(BenchError::InvalidConfiguration(
                "iterations must be greater than 0".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(BenchError::InvalidConfiguration(
                "workers must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(content).map_err(BenchError::ConfigParse)?;
        let mut cfg = Self::parse(raw.iterations, &raw.unit)?;
        cfg.warmup_iterations = raw.warmup_iterations;
        cfg.workers = raw.workers;
        cfg.color = raw.color;
        cfg.system_info = raw.system_info;
        cfg.validate()?;
        Ok(cfg)
    }
}
