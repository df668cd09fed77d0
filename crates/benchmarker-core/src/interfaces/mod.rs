// crates/benchmarker-core/src/interfaces/mod.rs
// ============================================================================
// Module: Benchmarker Interfaces
// Description: Backend-agnostic interfaces for reference lookups and run set storage.
// Purpose: Define the collaborator contracts the request handlers consume.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Handlers never reach for ambient global state. Every request runs against a
//! [`StoreSession`] obtained from a [`SessionSource`]; the session exposes the
//! reference catalog (read-only) and the run set store (writes), and is either
//! committed or rolled back as a unit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::core::BenchmarkName;
use crate::core::CommitHash;
use crate::core::Config;
use crate::core::Machine;
use crate::core::MetricKind;
use crate::core::MetricName;
use crate::core::Product;
use crate::core::Run;
use crate::core::RunSet;
use crate::core::RunSetId;

// ============================================================================
// SECTION: Reference Catalog
// ============================================================================

/// Reference catalog lookup errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Catalog backend could not be queried.
    #[error("reference catalog unavailable: {0}")]
    Unavailable(String),
    /// Catalog contents could not be decoded.
    #[error("reference catalog corrupt: {0}")]
    Corrupt(String),
}

/// Read-only reference data lookups.
///
/// Implementations must not mutate anything; they are called repeatedly while
/// a single request is validated.
pub trait ReferenceCatalog {
    /// Returns true when the machine (name and architecture) is known.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the lookup fails.
    fn machine_exists(&self, machine: &Machine) -> Result<bool, CatalogError>;

    /// Resolves a product reference to the full commit hash it points at.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the lookup fails.
    fn resolve_product(&self, product: &Product) -> Result<Option<CommitHash>, CatalogError>;

    /// Returns the set of known benchmark names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the lookup fails.
    fn benchmark_catalog(&self) -> Result<BTreeSet<BenchmarkName>, CatalogError>;

    /// Returns the known metrics and their expected value kinds.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the lookup fails.
    fn metric_catalog(&self) -> Result<BTreeMap<MetricName, MetricKind>, CatalogError>;

    /// Returns true when the configuration is known with identical attributes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the lookup fails.
    fn config_exists(&self, config: &Config) -> Result<bool, CatalogError>;
}

// ============================================================================
// SECTION: Run Set Store
// ============================================================================

/// Run set store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store I/O error.
    #[error("run set store io error: {0}")]
    Io(String),
    /// Stored data is corrupted or cannot be decoded.
    #[error("run set store corruption: {0}")]
    Corrupt(String),
    /// The submitted data was rejected by the store (for example a constraint).
    #[error("run set store rejected data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("run set store error: {0}")]
    Store(String),
}

/// Durable run set storage scoped to one session.
pub trait RunSetStore {
    /// Inserts the header fields of a run set and returns its new identifier.
    ///
    /// `run_set.runs` is ignored; runs are written by [`Self::insert_runs`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_run_set(&mut self, run_set: &RunSet) -> Result<RunSetId, StoreError>;

    /// Appends runs to an existing run set, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_runs(&mut self, id: RunSetId, runs: &[Run]) -> Result<(), StoreError>;

    /// Fetches a run set with all of its runs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn fetch_run_set(&self, id: RunSetId) -> Result<Option<RunSet>, StoreError>;

    /// Overwrites the mutable header fields of a stored run set.
    ///
    /// `run_set.runs` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails or the run set is missing.
    fn update_run_set(&mut self, id: RunSetId, run_set: &RunSet) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Sessions
// ============================================================================

/// One unit of work: catalog reads plus run set writes, committed or rolled back together.
///
/// Dropping a session without committing must roll it back.
pub trait StoreSession: ReferenceCatalog + RunSetStore {
    /// Commits every write made through the session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the commit fails; nothing is persisted then.
    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discards every write made through the session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend reports a rollback failure.
    fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Opens store sessions. Injected into the transaction executor.
pub trait SessionSource: Send + Sync {
    /// Begins a new session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a session cannot be started.
    fn begin(&self) -> Result<Box<dyn StoreSession + '_>, StoreError>;
}

/// Shared session source backed by an `Arc` trait object.
pub type SharedSessionSource = Arc<dyn SessionSource>;
