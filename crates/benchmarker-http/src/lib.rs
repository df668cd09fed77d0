// crates/benchmarker-http/src/lib.rs
// ============================================================================
// Module: Benchmarker HTTP
// Description: HTTP transport for the run set ingest service.
// Purpose: Route requests into the transactional handlers and audit them.
// Dependencies: benchmarker-core, axum, tokio
// ============================================================================

//! ## Overview
//! Benchmarker HTTP exposes `POST /runset` and `POST /runset/<id>` over
//! `axum`. Every request goes through one wrapper that checks the method,
//! reads the body, runs the handler inside a store session, and writes the
//! response only after the session is resolved.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RequestAuditEvent;
pub use audit::RequestAuditSink;
pub use audit::RequestOutcome;
pub use audit::StderrAuditSink;
pub use server::IngestServer;
pub use server::Route;
pub use server::ServerError;
pub use server::ServerState;
pub use server::build_router;
pub use server::serve_listener;
