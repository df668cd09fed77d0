// crates/benchmarker-core/src/lib.rs
// ============================================================================
// Module: Benchmarker Core Library
// Description: Public API surface for the benchmark result ingest core.
// Purpose: Expose run set types, collaborator interfaces, and request handlers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Benchmarker core validates benchmark run sets submitted by external clients
//! against reference data and records them through a transactional store
//! session. It knows nothing about HTTP or SQL: transports and backends plug in
//! through the interfaces in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CatalogError;
pub use interfaces::ReferenceCatalog;
pub use interfaces::RunSetStore;
pub use interfaces::SessionSource;
pub use interfaces::SharedSessionSource;
pub use interfaces::StoreError;
pub use interfaces::StoreSession;
pub use runtime::FALLBACK_ERROR_BODY;
pub use runtime::Fault;
pub use runtime::HandlerOutcome;
pub use runtime::HandlerResponse;
pub use runtime::InMemoryStore;
pub use runtime::RequestError;
pub use runtime::RequestErrorKind;
pub use runtime::Resolution;
pub use runtime::SuccessStatus;
pub use runtime::TransactionOutcome;
pub use runtime::amend_run_set;
pub use runtime::create_run_set;
pub use runtime::execute_in_transaction;
pub use runtime::merge_amendment;
pub use runtime::parse_run_set_path;
