// crates/benchmarker-config/src/lib.rs
// ============================================================================
// Module: Benchmarker Config Library
// Description: Config model, validation, and reference data seed loading.
// Purpose: Single source of truth for benchmarker.toml semantics.
// Dependencies: benchmarker-core, benchmarker-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `benchmarker-config` defines the configuration model for the ingest
//! service and the TOML seed format for reference data. Both loaders are
//! strict: unknown fields, oversized files, and invalid values are rejected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;
pub mod seed;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
pub use examples::seed_toml_example;
pub use seed::load_reference_data;
pub use seed::parse_reference_data;
