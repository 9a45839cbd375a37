//! CI Ingest Example
//!
//! Demonstrates one CI benchmark job end to end: load the persisted
//! `data.js`, append this commit's run, compare it with prior runs, and store
//! the updated history.
//!
//! Run with: cargo run --example ci_ingest
//! Verbose:  RUST_LOG=bench_ledger=debug cargo run --example ci_ingest

use anyhow::{Context, Result};
use bench_ledger::detect::{detect, DetectorConfig, Direction, Window};
use bench_ledger::history::{AppendResult, CommitInfo, Measurement, Person, RunRecord};
use bench_ledger::snapshot::{FileSnapshotStore, SnapshotStore};
use tracing_subscriber::EnvFilter;

const SUITE: &str = "Rust Benchmark";

fn commit_run(commit: &str, message: &str, scale: f64) -> RunRecord {
    RunRecord::builder(commit, "cargo")
        .commit(
            CommitInfo::new(commit)
                .with_message(message)
                .with_author(Person::new("Dev"))
                .with_url(format!("https://github.com/acme/widgets/commit/{commit}")),
        )
        .bench(Measurement::new("building/10", 100.0 * scale, 5.0, "ns/iter"))
        .bench(Measurement::new("building/1000", 9_500.0 * scale, 120.0, "ns/iter"))
        .bench(Measurement::new("throughput", 1_000.0 / scale, 10.0, "ops/s"))
        .build()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bench_ledger=info")),
        )
        .init();

    println!("=== bench-ledger CI Ingest ===\n");

    let dir = std::env::temp_dir().join("bench-ledger-demo");
    let backend = FileSnapshotStore::new(dir.join("data.js"));

    let config = DetectorConfig::builder()
        .window(Window::Last(3))
        .alert_threshold(1.5)
        .fail_threshold(2.0)
        .direction_for("throughput", Direction::BiggerIsBetter)
        .build()
        .context("invalid detector configuration")?;

    // -------------------------------------------------------------------------
    // Simulate a sequence of CI jobs, including one retried job
    // -------------------------------------------------------------------------
    let jobs = [
        ("a1b2c3", "Initial benches", 1.0),
        ("d4e5f6", "Refactor parser", 1.05),
        ("d4e5f6", "Refactor parser (retry)", 1.05),
        ("0719aa", "Switch to naive allocator", 1.8),
    ];

    for (commit, message, scale) in jobs {
        println!("Job for {commit}: {message}");

        let mut history = backend
            .load()
            .with_context(|| format!("failed to load {}", backend.path().display()))?;

        match history.append(SUITE, commit_run(commit, message, scale))? {
            AppendResult::Appended => println!("   appended"),
            AppendResult::Duplicate => {
                println!("   already recorded, nothing to do\n");
                continue;
            }
        }

        let series = history.require(SUITE)?;
        let report = detect(series, commit, &config)?;
        print!("{report}");
        if report.should_fail() {
            println!("   ✗ regression beyond fail threshold");
        }

        backend.store(&history).context("failed to store history")?;
        println!("   stored {} run(s)\n", series.len());
    }

    println!("Snapshot written to {}", backend.path().display());
    Ok(())
}
