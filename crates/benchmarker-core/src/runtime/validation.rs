// crates/benchmarker-core/src/runtime/validation.rs
// ============================================================================
// Module: Submission Validation
// Description: Existence and type checks against the reference catalog.
// Purpose: Reject submissions that reference unknown entities, fail-fast.
// Dependencies: crate::{core, interfaces, runtime::error}
// ============================================================================

//! ## Overview
//! Validation is a handful of independent, side-effect-free predicates over a
//! catalog snapshot, plus `ensure_*` wrappers that turn the first violation
//! into a client-fault [`RequestError`]. Violations are reported one at a time;
//! clients fix and resubmit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::Value;

use crate::core::BenchmarkName;
use crate::core::Config;
use crate::core::Machine;
use crate::core::MetricKind;
use crate::core::MetricName;
use crate::core::Product;
use crate::core::Run;
use crate::interfaces::ReferenceCatalog;
use crate::runtime::error::RequestError;

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Returns true when the metric is known and `value` has its expected shape.
#[must_use]
pub fn metric_allowed(
    metrics: &BTreeMap<MetricName, MetricKind>,
    name: &MetricName,
    value: &Value,
) -> bool {
    metrics.get(name).is_some_and(|kind| kind.accepts(value))
}

/// Returns true when both product lists contain the same products, ignoring order.
#[must_use]
pub fn secondary_products_match(left: &[Product], right: &[Product]) -> bool {
    let left: BTreeSet<&Product> = left.iter().collect();
    let right: BTreeSet<&Product> = right.iter().collect();
    left == right
}

/// Returns the first benchmark or metric violation, if any.
fn first_violation(
    benchmarks: &BTreeSet<BenchmarkName>,
    metrics: &BTreeMap<MetricName, MetricKind>,
    runs: &[Run],
    timed_out: &BTreeSet<BenchmarkName>,
    crashed: &BTreeSet<BenchmarkName>,
) -> Option<RequestError> {
    for run in runs {
        if !benchmarks.contains(&run.benchmark) {
            return Some(unknown_benchmark(&run.benchmark));
        }
        for (name, value) in &run.results {
            if !metric_allowed(metrics, name, value) {
                return Some(RequestError::bad_request(format!(
                    "Metric not supported or results of wrong type: {name}"
                )));
            }
        }
    }
    timed_out
        .iter()
        .chain(crashed.iter())
        .find(|benchmark| !benchmarks.contains(*benchmark))
        .map(unknown_benchmark)
}

/// Builds the client-fault error for an unknown benchmark.
fn unknown_benchmark(benchmark: &BenchmarkName) -> RequestError {
    RequestError::bad_request(format!("Benchmark does not exist: {benchmark}"))
}

// ============================================================================
// SECTION: Catalog Checks
// ============================================================================

/// Ensures the machine exists in the catalog.
///
/// # Errors
///
/// Returns a client-fault [`RequestError`] for unknown machines and a
/// server-fault one when the lookup fails.
pub fn ensure_machine_exists<C: ReferenceCatalog + ?Sized>(
    catalog: &C,
    machine: &Machine,
) -> Result<(), RequestError> {
    let exists = catalog
        .machine_exists(machine)
        .map_err(|err| RequestError::internal("Could not look up machine").with_detail(err))?;
    if exists {
        Ok(())
    } else {
        Err(RequestError::bad_request(format!("Machine does not exist: {}", machine.name)))
    }
}

/// Resolves a product reference, returning it with the full commit hash.
///
/// # Errors
///
/// Returns a client-fault [`RequestError`] when the product or revision cannot
/// be resolved and a server-fault one when the lookup fails.
pub fn ensure_product_exists<C: ReferenceCatalog + ?Sized>(
    catalog: &C,
    product: &Product,
) -> Result<Product, RequestError> {
    let resolved = catalog
        .resolve_product(product)
        .map_err(|err| RequestError::internal("Could not look up product").with_detail(err))?;
    match resolved {
        Some(commit) => Ok(Product {
            name: product.name.clone(),
            commit: commit.as_str().to_string(),
        }),
        None => Err(RequestError::bad_request(format!(
            "Product commit does not exist: {} {}",
            product.name, product.commit
        ))),
    }
}

/// Ensures every benchmark and metric named by the submission is known.
///
/// Runs are checked first (benchmark, then each metric), then the timed-out
/// and crashed sets. The first violation is reported.
///
/// # Errors
///
/// Returns a client-fault [`RequestError`] naming the offending benchmark or
/// metric, or a server-fault one when the catalog cannot be read.
pub fn ensure_benchmarks_and_metrics_exist<C: ReferenceCatalog + ?Sized>(
    catalog: &C,
    runs: &[Run],
    timed_out: &BTreeSet<BenchmarkName>,
    crashed: &BTreeSet<BenchmarkName>,
) -> Result<(), RequestError> {
    let benchmarks = catalog
        .benchmark_catalog()
        .map_err(|err| RequestError::internal("Could not fetch benchmarks").with_detail(err))?;
    let metrics = catalog
        .metric_catalog()
        .map_err(|err| RequestError::internal("Could not fetch metrics").with_detail(err))?;
    first_violation(&benchmarks, &metrics, runs, timed_out, crashed).map_or(Ok(()), Err)
}

/// Ensures the configuration exists with identical attributes.
///
/// # Errors
///
/// Returns a client-fault [`RequestError`] for unknown configurations and a
/// server-fault one when the lookup fails.
pub fn ensure_config_exists<C: ReferenceCatalog + ?Sized>(
    catalog: &C,
    config: &Config,
) -> Result<(), RequestError> {
    let exists = catalog
        .config_exists(config)
        .map_err(|err| RequestError::internal("Could not look up config").with_detail(err))?;
    if exists {
        Ok(())
    } else {
        Err(RequestError::bad_request(format!("Config does not exist: {}", config.name)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use serde_json::json;

    use super::*;

    fn catalog() -> (BTreeSet<BenchmarkName>, BTreeMap<MetricName, MetricKind>) {
        let benchmarks = ["nbody", "binarytrees"].into_iter().map(BenchmarkName::from).collect();
        let metrics = [
            (MetricName::from("time"), MetricKind::DoubleArray),
            (MetricName::from("memory-integral"), MetricKind::Double),
        ]
        .into_iter()
        .collect();
        (benchmarks, metrics)
    }

    fn run(benchmark: &str, results: &[(&str, Value)]) -> Run {
        Run {
            benchmark: BenchmarkName::from(benchmark),
            results: results
                .iter()
                .map(|(name, value)| (MetricName::from(*name), value.clone()))
                .collect(),
        }
    }

    #[test]
    fn clean_submission_has_no_violation() {
        let (benchmarks, metrics) = catalog();
        let runs = vec![run("nbody", &[("time", json!([1.0, 2.0]))])];
        let timed_out = [BenchmarkName::from("binarytrees")].into_iter().collect();
        assert!(
            first_violation(&benchmarks, &metrics, &runs, &timed_out, &BTreeSet::new()).is_none()
        );
    }

    #[test]
    fn unknown_benchmark_in_run_is_named() {
        let (benchmarks, metrics) = catalog();
        let runs = vec![run("fannkuch", &[])];
        let error = first_violation(&benchmarks, &metrics, &runs, &BTreeSet::new(), &BTreeSet::new())
            .unwrap();
        assert_eq!(error.explanation(), "Benchmark does not exist: fannkuch");
    }

    #[test]
    fn wrongly_typed_metric_is_named() {
        let (benchmarks, metrics) = catalog();
        let runs = vec![run("nbody", &[("memory-integral", json!("lots"))])];
        let error = first_violation(&benchmarks, &metrics, &runs, &BTreeSet::new(), &BTreeSet::new())
            .unwrap();
        assert_eq!(
            error.explanation(),
            "Metric not supported or results of wrong type: memory-integral"
        );
    }

    #[test]
    fn unknown_crashed_benchmark_is_rejected() {
        let (benchmarks, metrics) = catalog();
        let crashed = [BenchmarkName::from("ghost")].into_iter().collect();
        let error = first_violation(&benchmarks, &metrics, &[], &BTreeSet::new(), &crashed).unwrap();
        assert_eq!(error.explanation(), "Benchmark does not exist: ghost");
    }

    #[test]
    fn run_violations_are_reported_before_set_violations() {
        let (benchmarks, metrics) = catalog();
        let runs = vec![run("first", &[])];
        let timed_out = [BenchmarkName::from("second")].into_iter().collect();
        let error =
            first_violation(&benchmarks, &metrics, &runs, &timed_out, &BTreeSet::new()).unwrap();
        assert_eq!(error.explanation(), "Benchmark does not exist: first");
    }

    #[test]
    fn secondary_product_comparison_ignores_order() {
        let a = Product {
            name: "llvm".to_string(),
            commit: "aaa".to_string(),
        };
        let b = Product {
            name: "corefx".to_string(),
            commit: "bbb".to_string(),
        };
        assert!(secondary_products_match(&[a.clone(), b.clone()], &[b.clone(), a.clone()]));
        assert!(!secondary_products_match(&[a.clone()], &[a, b]));
    }
}
