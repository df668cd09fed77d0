// crates/benchmarker-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Store
// Description: Mutex-guarded reference catalog and run set store.
// Purpose: Back tests and local tooling without a database.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`InMemoryStore`] serializes sessions behind one mutex. A session works on
//! a copy of the state and writes it back only on commit, so rollback is
//! dropping the copy.
//!
//! # Invariants
//! - At most one session is open at a time.
//! - Run set identifiers start at 1 and are never reused.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::BenchmarkName;
use crate::core::CommitHash;
use crate::core::Config;
use crate::core::Machine;
use crate::core::MetricKind;
use crate::core::MetricName;
use crate::core::Product;
use crate::core::ReferenceData;
use crate::core::Run;
use crate::core::RunSet;
use crate::core::RunSetId;
use crate::core::resolve_commit;
use crate::interfaces::CatalogError;
use crate::interfaces::ReferenceCatalog;
use crate::interfaces::RunSetStore;
use crate::interfaces::SessionSource;
use crate::interfaces::StoreError;
use crate::interfaces::StoreSession;

// ============================================================================
// SECTION: State
// ============================================================================

/// Everything the in-memory store holds.
#[derive(Debug, Clone, Default)]
struct MemoryState {
    /// Reference catalog.
    reference: ReferenceData,
    /// Stored run sets keyed by identifier.
    run_sets: BTreeMap<RunSetId, RunSet>,
    /// Last identifier handed out.
    last_id: i32,
}

/// In-memory session source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Shared state.
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty store validating against `reference`.
    #[must_use]
    pub fn new(reference: ReferenceData) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                reference,
                ..MemoryState::default()
            })),
        }
    }

    /// Returns a committed run set, outside of any session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the store mutex is poisoned.
    pub fn run_set(&self, id: RunSetId) -> Result<Option<RunSet>, StoreError> {
        Ok(self.lock()?.run_sets.get(&id).cloned())
    }

    /// Returns the number of committed run sets.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the store mutex is poisoned.
    pub fn run_set_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.run_sets.len())
    }

    /// Locks the shared state.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Store("in-memory store mutex poisoned".to_string()))
    }
}

impl SessionSource for InMemoryStore {
    fn begin(&self) -> Result<Box<dyn StoreSession + '_>, StoreError> {
        let guard = self.lock()?;
        let working = guard.clone();
        Ok(Box::new(InMemorySession {
            guard,
            working,
        }))
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Open in-memory session holding the store lock.
struct InMemorySession<'a> {
    /// Committed state, locked for the lifetime of the session.
    guard: MutexGuard<'a, MemoryState>,
    /// Working copy written back on commit.
    working: MemoryState,
}

impl ReferenceCatalog for InMemorySession<'_> {
    fn machine_exists(&self, machine: &Machine) -> Result<bool, CatalogError> {
        Ok(self.working.reference.machines.contains(machine))
    }

    fn resolve_product(&self, product: &Product) -> Result<Option<CommitHash>, CatalogError> {
        Ok(self
            .working
            .reference
            .products
            .iter()
            .find(|entry| entry.name == product.name)
            .and_then(|entry| resolve_commit(&entry.commits, &product.commit)))
    }

    fn benchmark_catalog(&self) -> Result<BTreeSet<BenchmarkName>, CatalogError> {
        Ok(self.working.reference.benchmarks.iter().map(|entry| entry.name.clone()).collect())
    }

    fn metric_catalog(&self) -> Result<BTreeMap<MetricName, MetricKind>, CatalogError> {
        Ok(self
            .working
            .reference
            .metrics
            .iter()
            .map(|entry| (entry.name.clone(), entry.result_type))
            .collect())
    }

    fn config_exists(&self, config: &Config) -> Result<bool, CatalogError> {
        Ok(self.working.reference.configs.contains(config))
    }
}

impl RunSetStore for InMemorySession<'_> {
    fn insert_run_set(&mut self, run_set: &RunSet) -> Result<RunSetId, StoreError> {
        let next = self
            .working
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Store("run set identifiers exhausted".to_string()))?;
        self.working.last_id = next;
        let id = RunSetId::new(next);
        let mut header = run_set.clone();
        header.runs.clear();
        self.working.run_sets.insert(id, header);
        Ok(id)
    }

    fn insert_runs(&mut self, id: RunSetId, runs: &[Run]) -> Result<(), StoreError> {
        let known = &self.working.reference.benchmarks;
        if let Some(run) =
            runs.iter().find(|run| !known.iter().any(|entry| entry.name == run.benchmark))
        {
            return Err(StoreError::Invalid(format!("unknown benchmark {}", run.benchmark)));
        }
        let stored = self
            .working
            .run_sets
            .get_mut(&id)
            .ok_or_else(|| StoreError::Invalid(format!("run set {id} not found")))?;
        stored.runs.extend(runs.iter().cloned());
        Ok(())
    }

    fn fetch_run_set(&self, id: RunSetId) -> Result<Option<RunSet>, StoreError> {
        Ok(self.working.run_sets.get(&id).cloned())
    }

    fn update_run_set(&mut self, id: RunSetId, run_set: &RunSet) -> Result<(), StoreError> {
        let stored = self
            .working
            .run_sets
            .get_mut(&id)
            .ok_or_else(|| StoreError::Store(format!("run set {id} not found")))?;
        let runs = std::mem::take(&mut stored.runs);
        *stored = RunSet {
            runs,
            ..run_set.clone()
        };
        Ok(())
    }
}

impl StoreSession for InMemorySession<'_> {
    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self {
            mut guard,
            working,
        } = *self;
        *guard = working;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
