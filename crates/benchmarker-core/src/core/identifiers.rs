// crates/benchmarker-core/src/core/identifiers.rs
// ============================================================================
// Module: Benchmarker Identifiers
// Description: Strongly typed identifiers for run sets and reference entities.
// Purpose: Keep benchmark, metric, and commit names from being mixed up.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are thin wrappers with stable serialized forms. Name types
//! serialize as plain strings; [`RunSetId`] serializes as a 32-bit integer,
//! matching what benchmarking clients already parse.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Run Set Identifier
// ============================================================================

/// Store-assigned run set identifier.
///
/// # Invariants
/// - Values are assigned by the store; clients only ever echo them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunSetId(i32);

impl RunSetId {
    /// Creates a run set identifier from its raw value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RunSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RunSetId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.parse::<i32>().map(Self)
    }
}

// ============================================================================
// SECTION: Name Types
// ============================================================================

/// Benchmark name as listed in the benchmark catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkName(String);

impl BenchmarkName {
    /// Creates a new benchmark name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BenchmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for BenchmarkName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BenchmarkName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Metric name as listed in the metric catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricName(String);

impl MetricName {
    /// Creates a new metric name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for MetricName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MetricName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Full commit hash a product reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitHash(String);

impl CommitHash {
    /// Creates a new commit hash.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CommitHash {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CommitHash {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
