// Candidates take `&Vec<u64>` because the harness hands them `&A`.
#![allow(clippy::ptr_arg)]

use clap::Parser;
use funcbench::logging::{init_logger, LogLevel};
use funcbench::{Harness, HarnessConfig, Unit};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "funcbench")]
#[command(about = "Compare summation strategies with the funcbench harness")]
struct Args {
    /// Timed calls per candidate. Overrides the config file.
    #[arg(long)]
    iterations: Option<u64>,

    /// Display unit. Overrides the config file.
    #[arg(long, value_enum, ignore_case = true)]
    unit: Option<Unit>,

    /// Untimed calls per candidate before measuring.
    #[arg(long)]
    warmup: Option<u64>,

    /// Worker threads. Defaults to the global rayon pool.
    #[arg(long)]
    workers: Option<usize>,

    /// Number of integers each candidate sums.
    #[arg(long, default_value_t = 10_000)]
    size: u64,

    /// JSON harness configuration.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(long, default_value_t = false)]
    no_color: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

fn sum_for_each(v: &Vec<u64>) -> u64 {
    let mut acc = 0u64;
    for x in v {
        acc = acc.wrapping_add(*x);
    }
    acc
}

#[allow(clippy::needless_range_loop)]
fn sum_indexed(v: &Vec<u64>) -> u64 {
    let mut acc = 0u64;
    for i in 0..v.len() {
        acc = acc.wrapping_add(v[i]);
    }
    acc
}

fn sum_iter(v: &Vec<u64>) -> u64 {
    v.iter().sum()
}

fn sum_fold(v: &Vec<u64>) -> u64 {
    v.iter().fold(0u64, |a, b| a.wrapping_add(*b))
}

fn sum_reduce(v: &Vec<u64>) -> u64 {
    v.iter().copied().reduce(u64::wrapping_add).unwrap_or(0)
}

fn build_config(args: &Args) -> Result<HarnessConfig, Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => HarnessConfig::from_json_file(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(iterations) = args.iterations {
        cfg.iterations = iterations;
    }
    if let Some(unit) = args.unit {
        cfg.unit = unit;
    }
    if let Some(warmup) = args.warmup {
        cfg.warmup_iterations = warmup;
    }
    if let Some(workers) = args.workers {
        cfg.workers = Some(workers);
    }
    if args.no_color {
        cfg.color = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logger(args.log_level);

    let cfg = build_config(&args)?;
    let mut bench: Harness<Vec<u64>> = Harness::with_config(cfg)?;
    bench
        .register(sum_iter)
        .register(sum_for_each)
        .register(sum_indexed)
        .register(sum_fold)
        .register(sum_reduce);

    let data: Vec<u64> = (0..args.size).collect();
    if args.json {
        let report = bench.collect(data)?;
        println!("{}", report.to_json()?);
    } else {
        println!("Benchmarking with {} integers", args.size);
        bench.run(data)?;
    }

    Ok(())
}
