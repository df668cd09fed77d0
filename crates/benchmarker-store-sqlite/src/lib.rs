// crates/benchmarker-store-sqlite/src/lib.rs
// ============================================================================
// Module: Benchmarker SQLite Store Library
// Description: Durable run set store and reference catalog backed by SQLite.
// Purpose: Provide the production session source for the ingest service.
// Dependencies: benchmarker-core, rusqlite, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! `benchmarker-store-sqlite` implements
//! [`benchmarker_core::SessionSource`] on top of a single `SQLite` connection.
//! Each session is one `BEGIN IMMEDIATE` transaction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::ImportSummary;
pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
