// crates/benchmarker-core/src/runtime/mod.rs
// ============================================================================
// Module: Benchmarker Runtime
// Description: Request handlers, validation, merge policy, and the transaction executor.
// Purpose: Turn raw submissions into committed store writes or typed errors.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Handlers receive an open [`crate::interfaces::StoreSession`] and the raw
//! request body, and report a [`HandlerOutcome`]. The executor in
//! [`transaction`] owns the session lifecycle.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod amend;
pub mod create;
pub mod error;
pub mod merge;
pub mod store;
pub mod transaction;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use amend::amend_run_set;
pub use amend::parse_run_set_path;
pub use create::create_run_set;
pub use error::FALLBACK_ERROR_BODY;
pub use error::Fault;
pub use error::RequestError;
pub use error::RequestErrorKind;
pub use merge::merge_amendment;
pub use store::InMemoryStore;
pub use transaction::HandlerOutcome;
pub use transaction::HandlerResponse;
pub use transaction::Resolution;
pub use transaction::SuccessStatus;
pub use transaction::TransactionOutcome;
pub use transaction::execute_in_transaction;
