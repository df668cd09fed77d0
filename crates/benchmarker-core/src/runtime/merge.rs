// crates/benchmarker-core/src/runtime/merge.rs
// ============================================================================
// Module: Amendment Merge
// Description: Merge policy for amending a stored run set.
// Purpose: Fold late-arriving results into an existing run set.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Amendments only ever add data. Runs are appended in submission order, the
//! timed-out and crashed sets are unioned, and a benchmark that receives a
//! real result in the amendment is pruned from both sets. Benchmarks whose
//! results were already stored are never pruned by this step, so prior
//! entries survive unless the amendment itself resolves them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::BenchmarkName;
use crate::core::RunSet;
use crate::core::RunSetAmendment;

// ============================================================================
// SECTION: Merge
// ============================================================================

/// Returns `stored` with the amendment's data merged in.
#[must_use]
pub fn merge_amendment(stored: &RunSet, amendment: &RunSetAmendment) -> RunSet {
    let resolved: BTreeSet<&BenchmarkName> =
        amendment.runs.iter().map(|run| &run.benchmark).collect();
    let merge_set = |current: &BTreeSet<BenchmarkName>, incoming: &BTreeSet<BenchmarkName>| {
        current
            .union(incoming)
            .filter(|benchmark| !resolved.contains(benchmark))
            .cloned()
            .collect::<BTreeSet<BenchmarkName>>()
    };

    let mut merged = stored.clone();
    merged.runs.extend(amendment.runs.iter().cloned());
    merged.timed_out_benchmarks =
        merge_set(&stored.timed_out_benchmarks, &amendment.timed_out_benchmarks);
    merged.crashed_benchmarks = merge_set(&stored.crashed_benchmarks, &amendment.crashed_benchmarks);
    for url in &amendment.log_urls {
        if !merged.log_urls.contains(url) {
            merged.log_urls.push(url.clone());
        }
    }
    if let Some(finished_at) = amendment.finished_at {
        merged.finished_at = finished_at;
    }
    merged
}
