//! Property-based tests for bench-ledger
//!
//! Following the ruchy/aprender pattern:
//! - Test history invariants (idempotence, order, no loss, unit integrity)
//! - Test detector determinism and first-record safety
//! - Run with ProptestConfig::with_cases(100)

use bench_ledger::detect::{detect, BaselineStatistic, DetectorConfig, Verdict, Window};
use bench_ledger::history::{AppendResult, HistoryStore, Measurement, RunRecord};
use bench_ledger::snapshot::{decode, encode, SnapshotFormat};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

const NAMES: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

/// Generate one measurement drawn from a fixed name pool, always in "ns"
fn arb_measurement() -> impl Strategy<Value = Measurement> {
    (0..NAMES.len(), 0.0f64..1e9, 0.0f64..1e6)
        .prop_map(|(i, value, range)| Measurement::new(NAMES[i], value, range, "ns"))
}

/// Generate the `i`-th run of a history, with unique measurement names
fn arb_run(i: usize) -> impl Strategy<Value = RunRecord> {
    proptest::collection::vec(arb_measurement(), 1..=NAMES.len()).prop_map(move |benches| {
        let mut seen = std::collections::HashSet::new();
        let unique: Vec<Measurement> = benches
            .into_iter()
            .filter(|m| seen.insert(m.name().to_string()))
            .collect();
        let date = Utc
            .timestamp_millis_opt(1_700_000_000_000 + i64::try_from(i).unwrap() * 60_000)
            .unwrap();
        RunRecord::builder(format!("commit-{i:04}"), "cargo")
            .date(date)
            .benches(unique)
            .build()
    })
}

/// Generate a history of runs with distinct commit ids
fn arb_history(max_len: usize) -> impl Strategy<Value = Vec<RunRecord>> {
    (1..=max_len).prop_flat_map(|len| (0..len).map(arb_run).collect::<Vec<_>>())
}

fn arb_config() -> impl Strategy<Value = DetectorConfig> {
    (
        prop_oneof![Just(Window::All), (1usize..6).prop_map(Window::Last)],
        prop_oneof![
            Just(BaselineStatistic::Mean),
            Just(BaselineStatistic::Last),
            (0.0f64..3.0).prop_map(|multiple| BaselineStatistic::MeanStdDev { multiple }),
        ],
        1.01f64..5.0,
        any::<bool>(),
    )
        .prop_map(|(window, statistic, threshold, noise_gate)| {
            DetectorConfig::builder()
                .window(window)
                .statistic(statistic)
                .alert_threshold(threshold)
                .noise_gate(noise_gate)
                .build()
                .unwrap()
        })
}

fn build_store(runs: &[RunRecord]) -> HistoryStore {
    let mut store = HistoryStore::new();
    for run in runs {
        store.append("s", run.clone()).unwrap();
    }
    store
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // History Properties
    // ========================================================================

    /// Property: appending every run twice equals appending once
    #[test]
    fn prop_append_idempotent(runs in arb_history(12)) {
        let once = build_store(&runs);

        let mut twice = HistoryStore::new();
        for run in &runs {
            twice.append("s", run.clone()).unwrap();
            prop_assert_eq!(twice.append("s", run.clone()).unwrap(), AppendResult::Duplicate);
        }

        prop_assert_eq!(once.read("s"), twice.read("s"));
    }

    /// Property: records come back in exactly the append order, none lost
    #[test]
    fn prop_order_and_no_loss(runs in arb_history(20)) {
        let store = build_store(&runs);
        let series = store.read("s").unwrap();

        prop_assert_eq!(series.len(), runs.len());
        for (stored, original) in series.records().iter().zip(&runs) {
            prop_assert_eq!(stored.commit_id(), original.commit_id());
        }
    }

    /// Property: a unit conflict never changes the series
    #[test]
    fn prop_unit_conflict_leaves_series_unchanged(runs in arb_history(8), idx in 0..NAMES.len()) {
        let mut store = build_store(&runs);
        let before = store.read("s").unwrap().clone();
        let name = NAMES[idx];

        let conflicting = RunRecord::new("conflict", "cargo", vec![Measurement::new(name, 1.0, 0.0, "ms")]);
        let result = store.append("s", conflicting);

        if before.unit_of(name).is_some() {
            prop_assert!(result.is_err());
            prop_assert_eq!(store.read("s").unwrap(), &before);
        } else {
            prop_assert_eq!(result.unwrap(), AppendResult::Appended);
        }
    }

    /// Property: encode → decode preserves every series
    #[test]
    fn prop_snapshot_preserves_series(runs in arb_history(10)) {
        let store = build_store(&runs);

        let reloaded = decode(&encode(&store, SnapshotFormat::JsAssignment).unwrap()).unwrap();

        prop_assert_eq!(reloaded.read("s"), store.read("s"));
    }

    // ========================================================================
    // Detector Properties
    // ========================================================================

    /// Property: identical inputs give identical reports
    #[test]
    fn prop_detect_deterministic(runs in arb_history(10), config in arb_config(), pick in any::<prop::sample::Index>()) {
        let store = build_store(&runs);
        let series = store.read("s").unwrap();
        let target = runs[pick.index(runs.len())].commit_id();

        let first = detect(series, target, &config).unwrap();
        let second = detect(series, target, &config).unwrap();

        prop_assert_eq!(first, second);
    }

    /// Property: the first run never produces verdicts
    #[test]
    fn prop_first_record_safe(runs in arb_history(10), config in arb_config()) {
        let store = build_store(&runs);

        let report = detect(store.read("s").unwrap(), runs[0].commit_id(), &config).unwrap();

        prop_assert!(report.verdicts().is_empty());
    }

    /// Property: exactly one verdict per name shared with the baseline window
    #[test]
    fn prop_one_verdict_per_common_name(runs in arb_history(10), config in arb_config()) {
        let store = build_store(&runs);
        let series = store.read("s").unwrap();
        let last = runs.len() - 1;
        let start = match config.window() {
            Window::All => 0,
            Window::Last(k) => last.saturating_sub(k),
        };

        let report = detect(series, runs[last].commit_id(), &config).unwrap();

        let expected = runs[last]
            .benches()
            .iter()
            .filter(|m| runs[start..last].iter().any(|r| r.bench(m.name()).is_some()))
            .count();
        prop_assert_eq!(report.verdicts().len(), expected);
    }

    /// Property: a value identical to a single-sample baseline is never flagged
    #[test]
    fn prop_unchanged_value_is_neutral(value in 1.0f64..10_000.0, threshold in 1.01f64..5.0) {
        let mut store = HistoryStore::new();
        store.append("s", RunRecord::new("c1", "cargo", vec![Measurement::new("a", value, 0.0, "ns")])).unwrap();
        store.append("s", RunRecord::new("c2", "cargo", vec![Measurement::new("a", value, 0.0, "ns")])).unwrap();
        let config = DetectorConfig::builder().alert_threshold(threshold).build().unwrap();

        let report = detect(store.read("s").unwrap(), "c2", &config).unwrap();

        prop_assert_eq!(report.verdict_for("a").unwrap().verdict, Verdict::Neutral);
    }
}
