//! lazyseq benchmark harness
//!
//! Measures what each layer costs over a plain loop: pushing through a
//! sequence, pulling through a cursor, and filtering both ways.
//!
//! Text output follows `BENCH:lazyseq:<name>:<result>:<time_ms>`, one line
//! per benchmark. `--json` prints a single report instead.

use clap::Parser as ClapParser;
use lazyseq_core::{Sequence, collect, filter, fold, from_iter, from_slice, from_visit};
use lazyseq_runtime::{Cursor, StrandStats, strand_stats};
use serde::Serialize;
use std::hint::black_box;
use std::process;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "lazyseq-bench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compare loops, push sequences and pull cursors", long_about = None)]
struct Args {
    /// Elements per run
    #[arg(long, default_value_t = 1024 * 1024)]
    size: usize,

    /// Runs per benchmark
    #[arg(long, default_value_t = 10)]
    iterations: u32,

    /// Run only the named benchmark
    #[arg(long, value_name = "NAME")]
    only: Option<String>,

    /// Print a JSON report instead of BENCH lines
    #[arg(long)]
    json: bool,
}

struct Bench {
    name: &'static str,
    run: fn(&[u64]) -> u64,
}

const BENCHES: &[Bench] = &[
    Bench {
        name: "range",
        run: range,
    },
    Bench {
        name: "push",
        run: push_sum,
    },
    Bench {
        name: "pull",
        run: pull_sum,
    },
    Bench {
        name: "range-filter-slice",
        run: range_filter_slice,
    },
    Bench {
        name: "filter-slice",
        run: filter_slice,
    },
    Bench {
        name: "filter-for",
        run: filter_for,
    },
    Bench {
        name: "pull-filter",
        run: pull_filter,
    },
];

#[derive(Serialize)]
struct BenchResult {
    name: &'static str,
    size: usize,
    iterations: u32,
    result: u64,
    total_ms: f64,
    per_iteration_ms: f64,
}

#[derive(Serialize)]
struct Report {
    results: Vec<BenchResult>,
    strands: StrandStats,
}

/// Baseline: a plain loop over the slice
fn range(input: &[u64]) -> u64 {
    let mut cnt = 0;
    for value in input {
        cnt += value;
    }
    cnt
}

/// A push sequence counting up to `n`
fn counter(n: u64) -> impl Sequence<Item = u64> + Send + 'static {
    from_visit(move |visitor: &mut dyn FnMut(u64) -> bool| {
        for value in 0..n {
            if !visitor(value) {
                break;
            }
        }
    })
}

fn push_sum(input: &[u64]) -> u64 {
    fold(counter(input.len() as u64), 0, |acc, value| acc + value)
}

/// Push converted to pull: one coroutine handoff per element
fn pull_sum(input: &[u64]) -> u64 {
    Cursor::new(counter(input.len() as u64)).sum()
}

fn is_even(value: &u64) -> bool {
    value % 2 == 0
}

/// Baseline: filter into a preallocated vector
fn range_filter_slice(input: &[u64]) -> u64 {
    let mut ret = Vec::with_capacity(input.len());
    for value in input {
        if is_even(value) {
            ret.push(*value);
        }
    }
    ret.len() as u64
}

fn filter_slice(input: &[u64]) -> u64 {
    collect(filter(from_slice(input), is_even)).len() as u64
}

/// Filter without allocating
fn filter_for(input: &[u64]) -> u64 {
    fold(filter(from_slice(input), is_even), 0, |acc, value| acc + value)
}

fn pull_filter(input: &[u64]) -> u64 {
    Cursor::new(filter(from_iter(0..input.len() as u64), is_even)).sum()
}

fn run_bench(bench: &Bench, input: &[u64], iterations: u32) -> BenchResult {
    debug!(bench = bench.name, iterations, "running");
    let mut result = 0;
    let start = Instant::now();
    for _ in 0..iterations {
        result = black_box((bench.run)(black_box(input)));
    }
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    BenchResult {
        name: bench.name,
        size: input.len(),
        iterations,
        result,
        total_ms,
        per_iteration_ms: total_ms / f64::from(iterations.max(1)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(only) = &args.only {
        if !BENCHES.iter().any(|b| b.name == only.as_str()) {
            let names: Vec<&str> = BENCHES.iter().map(|b| b.name).collect();
            eprintln!("Unknown benchmark '{}'. Available: {}", only, names.join(", "));
            process::exit(2);
        }
    }

    let input: Vec<u64> = (0..args.size as u64).collect();
    info!(size = args.size, iterations = args.iterations, "starting benchmarks");

    let results: Vec<BenchResult> = BENCHES
        .iter()
        .filter(|b| args.only.as_deref().is_none_or(|only| only == b.name))
        .map(|b| run_bench(b, &input, args.iterations))
        .collect();

    if args.json {
        let report = Report {
            results,
            strands: strand_stats(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                process::exit(1);
            }
        }
    } else {
        for r in &results {
            println!(
                "BENCH:lazyseq:{}:{}:{:.0}",
                r.name, r.result, r.per_iteration_ms
            );
        }
    }
}
