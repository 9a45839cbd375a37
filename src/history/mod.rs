//! Benchmark History Schema
//!
//! This module provides the append-only ledger of benchmark runs, keyed by
//! the commit each run measured.
//!
//! ## Schema Overview
//!
//! ```text
//! HistoryStore ──< SuiteSeries (per suite name)
//!                      │
//!                      └──< RunRecord (append order, unique commit id)
//!                               │
//!                               └──< Measurement (name, value, range, unit)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use bench_ledger::history::{HistoryStore, Measurement, RunRecord};
//!
//! let mut store = HistoryStore::with_repo_url("https://github.com/acme/widgets");
//!
//! let run = RunRecord::builder("9f1c2e7", "cargo")
//!     .bench(Measurement::new("build/1000", 100.0, 5.0, "ns/iter"))
//!     .build();
//! store.append("widgets", run)?;
//!
//! let series = store.read("widgets").expect("suite was just created");
//! assert_eq!(series.latest().map(|r| r.commit_id()), Some("9f1c2e7"));
//! # Ok::<(), bench_ledger::Error>(())
//! ```

mod measurement;
mod run_record;
mod series;
mod store;

pub use measurement::Measurement;
pub use run_record::{CommitInfo, Person, RunRecord, RunRecordBuilder};
pub use series::{AppendResult, SuiteSeries};
pub use store::HistoryStore;
