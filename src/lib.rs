//! # bench-ledger: Continuous Benchmarking History Store
//!
//! **Version**: 0.1.0
//!
//! bench-ledger keeps an append-only, commit-keyed history of benchmark runs
//! and flags performance regressions of a new run against prior runs.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke safety**: Idempotent append keyed on commit id; retried CI
//!   jobs never duplicate history
//! - **Jidoka**: Unit mismatches stop the line instead of being auto-corrected
//! - **Genchi Genbutsu**: Regressions are judged against measured spread, not
//!   single samples
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bench_ledger::detect::{detect, DetectorConfig};
//! use bench_ledger::history::{Measurement, RunRecord};
//! use bench_ledger::snapshot::{FileSnapshotStore, SnapshotStore};
//!
//! let backend = FileSnapshotStore::new("dev/bench/data.js");
//! let mut history = backend.load()?;
//!
//! let run = RunRecord::new("9f1c2e7", "cargo", vec![Measurement::new("parse", 120.0, 4.0, "ns/iter")]);
//! history.append("parser", run)?;
//!
//! let report = detect(history.require("parser")?, "9f1c2e7", &DetectorConfig::default())?;
//! print!("{report}");
//!
//! backend.store(&history)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod detect;
pub mod error;
pub mod history;
pub mod snapshot;

pub use error::{Error, Result};
