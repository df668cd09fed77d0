// crates/benchmarker-http/src/audit.rs
// ============================================================================
// Module: Request Audit Logging
// Description: Structured audit events for ingest request handling.
// Purpose: Emit one JSON line per request without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each HTTP request produces exactly one [`RequestAuditEvent`]. Sinks write
//! the event as a JSON line to stderr or to an append-only file, or drop it.
//! Internal error detail only ever leaves the process through these sinks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How a request ended with respect to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// The handler's writes were committed.
    Committed,
    /// A session was opened and rolled back.
    RolledBack,
    /// The request was refused before a session was opened.
    Rejected,
}

/// Ingest request audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method as received.
    pub method: String,
    /// Request path as received.
    pub path: String,
    /// Matched route label, if any.
    pub route: Option<&'static str>,
    /// HTTP status written.
    pub status: u16,
    /// Store outcome.
    pub outcome: RequestOutcome,
    /// Request body size in bytes (zero when the body was not read).
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Client-facing explanation for error responses.
    pub explanation: Option<String>,
    /// Internal diagnostic detail for server faults.
    pub detail: Option<String>,
    /// Rollback failure detail, if the rollback itself failed.
    pub rollback_error: Option<String>,
}

/// Inputs required to construct a request audit event.
pub struct RequestAuditEventParams {
    /// HTTP method as received.
    pub method: String,
    /// Request path as received.
    pub path: String,
    /// Matched route label, if any.
    pub route: Option<&'static str>,
    /// HTTP status written.
    pub status: u16,
    /// Store outcome.
    pub outcome: RequestOutcome,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Client-facing explanation for error responses.
    pub explanation: Option<String>,
    /// Internal diagnostic detail for server faults.
    pub detail: Option<String>,
    /// Rollback failure detail.
    pub rollback_error: Option<String>,
}

impl RequestAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: RequestAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "ingest_request",
            timestamp_ms,
            method: params.method,
            path: params.path,
            route: params.route,
            status: params.status,
            outcome: params.outcome,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
            explanation: params.explanation,
            detail: params.detail,
            rollback_error: params.rollback_error,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for ingest request events.
pub trait RequestAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &RequestAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RequestAuditSink for StderrAuditSink {
    fn record(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RequestAuditSink for FileAuditSink {
    fn record(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl RequestAuditSink for NoopAuditSink {
    fn record(&self, _event: &RequestAuditEvent) {}
}
