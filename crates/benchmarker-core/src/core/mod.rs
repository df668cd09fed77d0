// crates/benchmarker-core/src/core/mod.rs
// ============================================================================
// Module: Benchmarker Core Types
// Description: Run set data model, identifiers, and reference data.
// Purpose: Group the serializable types shared by every crate in the workspace.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Core types model what benchmarking clients submit (run sets and their runs)
//! and the reference data submissions are validated against.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod reference;
pub mod run_set;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::BenchmarkName;
pub use identifiers::CommitHash;
pub use identifiers::MetricName;
pub use identifiers::RunSetId;
pub use reference::BenchmarkEntry;
pub use reference::MetricEntry;
pub use reference::MetricKind;
pub use reference::ProductEntry;
pub use reference::ReferenceData;
pub use reference::resolve_commit;
pub use run_set::Config;
pub use run_set::Machine;
pub use run_set::Product;
pub use run_set::Run;
pub use run_set::RunSet;
pub use run_set::RunSetAmendment;
