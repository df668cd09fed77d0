// crates/benchmarker-core/tests/proptest_merge.rs
// ============================================================================
// Module: Merge Property-Based Tests
// Description: Property tests for amendment merging and product set comparison.
// Purpose: Check merge invariants across arbitrary run and benchmark sets.
// ============================================================================

//! Property-based tests for amendment merge invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use benchmarker_core::BenchmarkName;
use benchmarker_core::Config;
use benchmarker_core::Machine;
use benchmarker_core::Product;
use benchmarker_core::Run;
use benchmarker_core::RunSet;
use benchmarker_core::RunSetAmendment;
use benchmarker_core::merge_amendment;
use benchmarker_core::runtime::validation::secondary_products_match;
use proptest::prelude::*;
use time::macros::datetime;

fn benchmark_strategy() -> impl Strategy<Value = BenchmarkName> {
    "[a-f]{1,2}".prop_map(BenchmarkName::from)
}

fn runs_strategy() -> impl Strategy<Value = Vec<Run>> {
    prop::collection::vec(
        benchmark_strategy().prop_map(|benchmark| Run {
            benchmark,
            results: BTreeMap::new(),
        }),
        0 .. 6,
    )
}

fn set_strategy() -> impl Strategy<Value = BTreeSet<BenchmarkName>> {
    prop::collection::btree_set(benchmark_strategy(), 0 .. 5)
}

fn product_strategy() -> impl Strategy<Value = Product> {
    ("[a-z]{1,6}", "[0-9a-f]{8}").prop_map(|(name, commit)| Product {
        name,
        commit,
    })
}

fn stored(
    runs: Vec<Run>,
    timed_out: BTreeSet<BenchmarkName>,
    crashed: BTreeSet<BenchmarkName>,
) -> RunSet {
    RunSet {
        started_at: datetime!(2016-05-01 10:00 UTC),
        finished_at: datetime!(2016-05-01 11:00 UTC),
        build_url: None,
        log_urls: vec!["https://logs.example/1".to_string()],
        main_product: Product {
            name: "mono".to_string(),
            commit: "0123456789abcdef".to_string(),
        },
        secondary_products: Vec::new(),
        machine: Machine {
            name: "bench-01".to_string(),
            architecture: "amd64".to_string(),
        },
        config: Config {
            name: "default".to_string(),
            mono_executable: String::new(),
            mono_environment_variables: BTreeMap::new(),
            mono_options: Vec::new(),
        },
        timed_out_benchmarks: timed_out,
        crashed_benchmarks: crashed,
        runs,
    }
}

fn amendment_from(
    base: &RunSet,
    runs: Vec<Run>,
    timed_out: BTreeSet<BenchmarkName>,
    crashed: BTreeSet<BenchmarkName>,
) -> RunSetAmendment {
    RunSetAmendment {
        main_product: base.main_product.clone(),
        secondary_products: base.secondary_products.clone(),
        machine: base.machine.clone(),
        config: base.config.clone(),
        finished_at: None,
        log_urls: vec!["https://logs.example/1".to_string()],
        timed_out_benchmarks: timed_out,
        crashed_benchmarks: crashed,
        runs,
    }
}

proptest! {
    #[test]
    fn merged_runs_are_stored_then_incoming(
        stored_runs in runs_strategy(),
        incoming_runs in runs_strategy(),
    ) {
        let base = stored(stored_runs.clone(), BTreeSet::new(), BTreeSet::new());
        let amendment = amendment_from(&base, incoming_runs.clone(), BTreeSet::new(), BTreeSet::new());
        let merged = merge_amendment(&base, &amendment);

        let mut expected = stored_runs;
        expected.extend(incoming_runs);
        prop_assert_eq!(merged.runs, expected);
        prop_assert_eq!(merged.log_urls, base.log_urls);
        prop_assert_eq!(merged.finished_at, base.finished_at);
    }

    #[test]
    fn merged_sets_keep_every_entry_without_a_new_result(
        stored_timed_out in set_strategy(),
        stored_crashed in set_strategy(),
        incoming_timed_out in set_strategy(),
        incoming_crashed in set_strategy(),
        incoming_runs in runs_strategy(),
    ) {
        let base = stored(Vec::new(), stored_timed_out.clone(), stored_crashed.clone());
        let amendment = amendment_from(
            &base,
            incoming_runs.clone(),
            incoming_timed_out.clone(),
            incoming_crashed.clone(),
        );
        let merged = merge_amendment(&base, &amendment);
        let resolved: BTreeSet<BenchmarkName> =
            incoming_runs.into_iter().map(|run| run.benchmark).collect();

        for benchmark in stored_timed_out.union(&incoming_timed_out) {
            prop_assert_eq!(
                merged.timed_out_benchmarks.contains(benchmark),
                !resolved.contains(benchmark)
            );
        }
        for benchmark in stored_crashed.union(&incoming_crashed) {
            prop_assert_eq!(
                merged.crashed_benchmarks.contains(benchmark),
                !resolved.contains(benchmark)
            );
        }
        prop_assert!(merged.timed_out_benchmarks.is_subset(
            &stored_timed_out.union(&incoming_timed_out).cloned().collect()
        ));
        prop_assert!(merged.crashed_benchmarks.is_subset(
            &stored_crashed.union(&incoming_crashed).cloned().collect()
        ));
    }

    #[test]
    fn secondary_product_comparison_is_order_insensitive(
        products in prop::collection::vec(product_strategy(), 0 .. 6),
        seed in any::<u64>(),
    ) {
        let mut shuffled = products.clone();
        let len = shuffled.len();
        if len > 1 {
            let rotation = usize::try_from(seed % (len as u64)).unwrap();
            shuffled.rotate_left(rotation);
            shuffled.reverse();
        }
        prop_assert!(secondary_products_match(&products, &shuffled));
    }

    #[test]
    fn secondary_product_comparison_detects_missing_products(
        products in prop::collection::btree_set(product_strategy(), 1 .. 6),
    ) {
        let all: Vec<Product> = products.into_iter().collect();
        let fewer = &all[1 ..];
        prop_assert!(!secondary_products_match(&all, fewer));
    }
}
