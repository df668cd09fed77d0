// crates/benchmarker-core/src/core/run_set.rs
// ============================================================================
// Module: Run Set Model
// Description: Run sets, runs, and the product/machine/config references.
// Purpose: Define the submission and storage shape of benchmark results.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! A [`RunSet`] is one batch of benchmark results tied to a single machine,
//! product, and configuration. Field names on the wire are `PascalCase` to
//! stay compatible with existing benchmarking clients.
//!
//! [`RunSetAmendment`] is the partial payload accepted when amending a stored
//! run set. Its identifying fields are compared against the stored run set,
//! never written.
//!
//! Collection fields treat an explicit JSON `null` the same as an absent
//! field: both decode to an empty collection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::core::identifiers::BenchmarkName;
use crate::core::identifiers::MetricName;

// ============================================================================
// SECTION: References
// ============================================================================

/// Product reference: a product name plus a revision pointer.
///
/// # Invariants
/// - Once stored, `commit` holds the full resolved commit hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    /// Product name.
    pub name: String,
    /// Commit hash or unique hash prefix.
    pub commit: String,
}

/// Machine the benchmarks ran on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Machine {
    /// Machine name.
    pub name: String,
    /// Machine architecture label.
    pub architecture: String,
}

/// Runtime configuration the benchmarks ran under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Configuration name.
    pub name: String,
    /// Runtime executable name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mono_executable: String,
    /// Environment variables set for each run.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mono_environment_variables: BTreeMap<String, String>,
    /// Runtime command line options.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mono_options: Vec<String>,
}

// ============================================================================
// SECTION: Runs
// ============================================================================

/// One benchmark execution result within a run set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Run {
    /// Benchmark that produced the results.
    pub benchmark: BenchmarkName,
    /// Metric results keyed by metric name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: BTreeMap<MetricName, Value>,
}

/// A batch of benchmark results submitted together.
///
/// # Invariants
/// - Every benchmark named in `runs`, `timed_out_benchmarks`, and
///   `crashed_benchmarks` existed in the benchmark catalog when written.
/// - `main_product`, `secondary_products`, `machine`, and `config` never change
///   after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunSet {
    /// Time the benchmarking session started.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Time the benchmarking session finished.
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    /// CI build URL, when the run set came from a CI job.
    #[serde(rename = "BuildURL", default)]
    pub build_url: Option<String>,
    /// Log URLs in submission order.
    #[serde(rename = "LogURLs", default, deserialize_with = "null_as_default")]
    pub log_urls: Vec<String>,
    /// Product under test.
    pub main_product: Product,
    /// Additional products the run depended on (order irrelevant).
    #[serde(default, deserialize_with = "null_as_default")]
    pub secondary_products: Vec<Product>,
    /// Machine the benchmarks ran on.
    pub machine: Machine,
    /// Configuration the benchmarks ran under.
    pub config: Config,
    /// Benchmarks that timed out.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timed_out_benchmarks: BTreeSet<BenchmarkName>,
    /// Benchmarks that crashed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub crashed_benchmarks: BTreeSet<BenchmarkName>,
    /// Benchmark results in submission order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub runs: Vec<Run>,
}

/// Partial run set submitted to amend a stored run set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunSetAmendment {
    /// Product under test; must match the stored run set.
    pub main_product: Product,
    /// Secondary products; must match the stored run set as a set.
    #[serde(default, deserialize_with = "null_as_default")]
    pub secondary_products: Vec<Product>,
    /// Machine; must match the stored run set.
    pub machine: Machine,
    /// Configuration; must match the stored run set.
    pub config: Config,
    /// Replacement finish time, when the session ran longer than first reported.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
    /// Additional log URLs.
    #[serde(rename = "LogURLs", default, deserialize_with = "null_as_default")]
    pub log_urls: Vec<String>,
    /// Benchmarks that timed out.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timed_out_benchmarks: BTreeSet<BenchmarkName>,
    /// Benchmarks that crashed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub crashed_benchmarks: BTreeSet<BenchmarkName>,
    /// New benchmark results.
    #[serde(default, deserialize_with = "null_as_default")]
    pub runs: Vec<Run>,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a field, mapping an explicit `null` to the type's default.
///
/// # Errors
///
/// Returns the deserializer error when the value is neither `null` nor `T`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
