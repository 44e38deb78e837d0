use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "rawmem workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the accessor workloads for every backend/allocator pair and report
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Accessor backends to measure
        #[arg(long, value_enum, value_delimiter = ',', default_values_t = Backend::ALL)]
        backends: Vec<Backend>,

        /// Global allocators to measure
        #[arg(long, value_enum, value_delimiter = ',', default_values_t = Allocator::ALL)]
        allocators: Vec<Allocator>,
    },
}

/// Value of `RAWMEM_BACKEND` for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Backend {
    System,
    Global,
}

impl Backend {
    const ALL: [Backend; 2] = [Backend::System, Backend::Global];

    fn env_value(self) -> &'static str {
        match self {
            Backend::System => "system",
            Backend::Global => "global",
        }
    }
}

/// `#[global_allocator]` selected through the suite's `alloc-*` features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Allocator {
    System,
    Mimalloc,
    Snmalloc,
    Jemalloc,
}

impl Allocator {
    const ALL: [Allocator; 4] = [
        Allocator::System,
        Allocator::Mimalloc,
        Allocator::Snmalloc,
        Allocator::Jemalloc,
    ];

    fn name(self) -> &'static str {
        match self {
            Allocator::System => "system",
            Allocator::Mimalloc => "mimalloc",
            Allocator::Snmalloc => "snmalloc",
            Allocator::Jemalloc => "jemalloc",
        }
    }

    fn feature(self) -> String {
        format!("alloc-{}", self.name())
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_value())
    }
}

impl fmt::Display for Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cell of the measurement matrix; also the criterion baseline name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Pair {
    backend: Backend,
    allocator: Allocator,
}

impl Pair {
    fn baseline(self) -> String {
        format!("{}-{}", self.backend, self.allocator)
    }

    fn from_baseline(name: &str) -> Option<Self> {
        let (backend, allocator) = name.split_once('-')?;
        Some(Self {
            backend: Backend::from_str(backend, true).ok()?,
            allocator: Allocator::from_str(allocator, true).ok()?,
        })
    }
}

/// The parts of criterion's `benchmark.json` the report needs.
#[derive(Deserialize)]
struct BenchmarkId {
    full_id: String,
    throughput: Option<Throughput>,
}

#[derive(Deserialize)]
enum Throughput {
    Elements(u64),
    Bytes(u64),
    BytesDecimal(u64),
}

impl Throughput {
    fn units(&self) -> f64 {
        match *self {
            Throughput::Elements(n) | Throughput::Bytes(n) | Throughput::BytesDecimal(n) => n as f64,
        }
    }
}

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

const SUITE: &str = "suite";
const CRITERION_DIR: &str = "target/criterion";
const REPORT_PATH: &str = "benchmark_results/report.md";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            backends,
            allocators,
        } => {
            let pairs: Vec<Pair> = backends
                .iter()
                .flat_map(|&backend| allocators.iter().map(move |&allocator| Pair { backend, allocator }))
                .collect();
            if pairs.is_empty() {
                bail!("nothing to measure: no backend or no allocator selected");
            }
            if !report_only {
                run_matrix(&pairs, quick)?;
            }
            generate_report(&pairs)?;
        }
    }

    Ok(())
}

fn run_matrix(pairs: &[Pair], quick: bool) -> Result<()> {
    let mut failed = Vec::new();

    for &pair in pairs {
        println!("\n>>> {} backend on {} allocator", pair.backend, pair.allocator);
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0")
            .env("RUSTFLAGS", "-C opt-level=3 -C codegen-units=1")
            .env("RAWMEM_BACKEND", pair.backend.env_value())
            .args(["bench", "--bench", SUITE, "--no-default-features", "--features"])
            .arg(pair.allocator.feature());

        // Criterion's own arguments
        cmd.arg("--").arg("--save-baseline").arg(pair.baseline());
        if quick {
            cmd.args(["--measurement-time", "0.1", "--sample-size", "10", "--noplot"]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("failed to launch cargo for {}", pair.baseline()))?;
        if status.success() {
            println!("Finished {} in {:.2?}", pair.baseline(), start.elapsed());
        } else {
            eprintln!("Warning: suite failed for {}", pair.baseline());
            failed.push(pair.baseline());
        }
    }

    if failed.len() == pairs.len() {
        bail!("every run failed: {}", failed.join(", "));
    }
    Ok(())
}

/// Throughput (units/s, or runs/s without a declared throughput) per workload
/// and pair.
type Results = BTreeMap<String, BTreeMap<Pair, f64>>;

fn generate_report(pairs: &[Pair]) -> Result<()> {
    println!("\n>>> Generating Report...");
    let criterion_dir = Path::new(CRITERION_DIR);
    if !criterion_dir.exists() {
        bail!("no criterion output at {}", criterion_dir.display());
    }

    let mut results = Results::new();
    for estimates in find_estimates(criterion_dir)? {
        if let Some((workload, pair, metric)) = read_measurement(&estimates)? {
            results.entry(workload).or_default().insert(pair, metric);
        }
    }

    let report_path = Path::new(REPORT_PATH);
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("cannot create {}", report_path.display()))?;
    write_report(&mut file, pairs, &results)?;

    println!("Report written to {}", report_path.display());
    Ok(())
}

/// Every `estimates.json` under a `new` or named baseline directory.
fn find_estimates(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).with_context(|| format!("cannot list {}", dir.display()))? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.file_name().is_some_and(|name| name == "estimates.json") {
                found.push(path);
            }
        }
    }
    Ok(found)
}

/// Reads one baseline directory: `.../<workload>/<baseline>/estimates.json`.
///
/// Baselines that are not a backend/allocator pair (`new`, `base`, `change`)
/// are skipped.
fn read_measurement(estimates_path: &Path) -> Result<Option<(String, Pair, f64)>> {
    let Some(baseline_dir) = estimates_path.parent() else {
        return Ok(None);
    };
    let Some(pair) = baseline_dir
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(Pair::from_baseline)
    else {
        return Ok(None);
    };

    let id: BenchmarkId = read_json(&baseline_dir.join("benchmark.json"))?;
    let estimates: Estimates = read_json(estimates_path)?;
    let time_ns = estimates.mean.point_estimate;
    if time_ns <= 0.0 {
        return Ok(None);
    }
    let units = id.throughput.as_ref().map_or(1.0, Throughput::units);
    Ok(Some((id.full_id, pair, units * 1e9 / time_ns)))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("malformed {}", path.display()))
}

/// One row per workload, one column per pair, each relative to the first pair.
fn write_report(out: &mut impl Write, pairs: &[Pair], results: &Results) -> Result<()> {
    let reference = pairs[0];

    writeln!(out, "# Accessor Backend Report")?;
    writeln!(out)?;
    writeln!(
        out,
        "Throughput per workload; ratios are against `{}`.",
        reference.baseline()
    )?;
    writeln!(out)?;

    write!(out, "| Workload |")?;
    for pair in pairs {
        write!(out, " {} / {} |", pair.backend, pair.allocator)?;
    }
    writeln!(out)?;
    write!(out, "|---|")?;
    for _ in pairs {
        write!(out, "---|")?;
    }
    writeln!(out)?;

    for (workload, measured) in results {
        write!(out, "| {} |", workload)?;
        let base = measured.get(&reference).copied();
        for pair in pairs {
            match (measured.get(pair), base) {
                (Some(&ops), Some(base)) if base > 0.0 => {
                    write!(out, " {} (**{:.2}x**) |", human(ops), ops / base)?
                }
                (Some(&ops), _) => write!(out, " {} |", human(ops))?,
                (None, _) => write!(out, " N/A |")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn human(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M/s", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K/s", ops / 1_000.0)
    } else {
        format!("{:.0}/s", ops)
    }
}
