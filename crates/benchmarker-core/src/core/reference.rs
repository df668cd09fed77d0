// crates/benchmarker-core/src/core/reference.rs
// ============================================================================
// Module: Reference Data
// Description: Catalog entries for machines, products, benchmarks, metrics, and configs.
// Purpose: Describe the reference data submissions are validated against.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Reference data is owned by operators, not by benchmarking clients. The
//! ingest path only reads it. [`ReferenceData`] is the bulk form used to seed a
//! store and to back the in-memory store used in tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::BenchmarkName;
use crate::core::identifiers::CommitHash;
use crate::core::identifiers::MetricName;
use crate::core::run_set::Config;
use crate::core::run_set::Machine;

// ============================================================================
// SECTION: Metric Kinds
// ============================================================================

/// Expected value shape for a metric's results.
///
/// # Invariants
/// - Labels are stable; they are persisted in stores and seed files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// A single number.
    #[serde(rename = "double")]
    Double,
    /// An array of numbers (one sample per iteration).
    #[serde(rename = "doubleArray")]
    DoubleArray,
    /// A string value.
    #[serde(rename = "string")]
    String,
}

impl MetricKind {
    /// Returns the stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::DoubleArray => "doubleArray",
            Self::String => "string",
        }
    }

    /// Parses a stable label back into a kind.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "double" => Some(Self::Double),
            "doubleArray" => Some(Self::DoubleArray),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// Returns true when `value` has the shape this kind expects.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Double => value.is_number(),
            Self::DoubleArray => {
                value.as_array().is_some_and(|items| items.iter().all(Value::is_number))
            }
            Self::String => value.is_string(),
        }
    }
}

// ============================================================================
// SECTION: Catalog Entries
// ============================================================================

/// Product catalog entry with its known commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ProductEntry {
    /// Product name.
    pub name: String,
    /// Full commit hashes known for the product.
    #[serde(default)]
    pub commits: Vec<CommitHash>,
}

/// Benchmark catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct BenchmarkEntry {
    /// Benchmark name.
    pub name: BenchmarkName,
}

/// Metric catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct MetricEntry {
    /// Metric name.
    pub name: MetricName,
    /// Expected value shape.
    pub result_type: MetricKind,
}

/// Bulk reference data used to seed a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceData {
    /// Known machines.
    #[serde(default)]
    pub machines: Vec<Machine>,
    /// Known products and commits.
    #[serde(default)]
    pub products: Vec<ProductEntry>,
    /// Known benchmarks.
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkEntry>,
    /// Known metrics.
    #[serde(default)]
    pub metrics: Vec<MetricEntry>,
    /// Known configurations.
    #[serde(default)]
    pub configs: Vec<Config>,
}

// ============================================================================
// SECTION: Commit Resolution
// ============================================================================

/// Resolves a client-supplied revision against the known commits of a product.
///
/// An exact match wins. Otherwise the revision must be a prefix of exactly one
/// known commit. Empty, unknown, and ambiguous revisions do not resolve.
#[must_use]
pub fn resolve_commit(known: &[CommitHash], requested: &str) -> Option<CommitHash> {
    if requested.is_empty() {
        return None;
    }
    if let Some(exact) = known.iter().find(|commit| commit.as_str() == requested) {
        return Some(exact.clone());
    }
    let mut matches = known.iter().filter(|commit| commit.as_str().starts_with(requested));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.clone())
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

    fn commits() -> Vec<CommitHash> {
        vec![CommitHash::new("abc123ff"), CommitHash::new("abd99900"), CommitHash::new("abc")]
    }

    #[test]
    fn exact_commit_wins_over_prefix() {
        assert_eq!(resolve_commit(&commits(), "abc"), Some(CommitHash::new("abc")));
    }

    #[test]
    fn unique_prefix_resolves() {
        assert_eq!(resolve_commit(&commits(), "abd"), Some(CommitHash::new("abd99900")));
    }

    #[test]
    fn ambiguous_empty_and_unknown_do_not_resolve() {
        assert_eq!(resolve_commit(&commits(), "ab"), None);
        assert_eq!(resolve_commit(&commits(), ""), None);
        assert_eq!(resolve_commit(&commits(), "ffff"), None);
    }

    #[test]
    fn metric_kinds_check_value_shape() {
        assert!(MetricKind::Double.accepts(&json!(1.5)));
        assert!(!MetricKind::Double.accepts(&json!([1.5])));
        assert!(MetricKind::DoubleArray.accepts(&json!([1, 2.5])));
        assert!(MetricKind::DoubleArray.accepts(&json!([])));
        assert!(!MetricKind::DoubleArray.accepts(&json!([1, "x"])));
        assert!(MetricKind::String.accepts(&json!("abc")));
        assert!(!MetricKind::String.accepts(&json!(null)));
    }

    #[test]
    fn metric_kind_labels_round_trip() {
        for kind in [MetricKind::Double, MetricKind::DoubleArray, MetricKind::String] {
            assert_eq!(MetricKind::from_label(kind.as_str()), Some(kind));
        }
        assert_eq!(MetricKind::from_label("int"), None);
    }
}
