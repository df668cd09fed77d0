// crates/benchmarker-core/src/runtime/error.rs
// ============================================================================
// Module: Request Errors
// Description: Typed request failures with a client-facing explanation.
// Purpose: Give every pipeline stage one uniform failure shape.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`RequestError`] is either a client fault (bad input, unknown reference
//! entity, mismatch) or a server fault (storage, serialization). Only the
//! explanation is ever serialized; internal diagnostics ride along in
//! `detail` so the transport can log them locally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Wire payload emitted when an error cannot itself be encoded.
pub const FALLBACK_ERROR_BODY: &str = "{\"Explanation\": \"unknown\"}";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request failure classification.
///
/// # Invariants
/// - Each kind maps to exactly one [`Fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestErrorKind {
    /// Malformed input, unknown reference entity, or semantic mismatch.
    BadRequest,
    /// No such endpoint.
    NotFound,
    /// Request method not accepted by the route.
    MethodNotAllowed,
    /// Storage or serialization failure.
    Internal,
}

impl RequestErrorKind {
    /// Returns who is at fault for this kind of failure.
    #[must_use]
    pub const fn fault(self) -> Fault {
        match self {
            Self::BadRequest | Self::NotFound | Self::MethodNotAllowed => Fault::Client,
            Self::Internal => Fault::Server,
        }
    }
}

/// Severity tier of a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    /// The client must fix the request and resubmit.
    Client,
    /// The service failed; the request may be retried unchanged.
    Server,
}

/// Typed request failure.
///
/// # Invariants
/// - Serialization emits only `{"Explanation": ...}`.
/// - `detail` never leaves the process except through local logging.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{explanation}")]
pub struct RequestError {
    /// Failure classification.
    #[serde(skip)]
    kind: RequestErrorKind,
    /// Client-facing explanation.
    #[serde(rename = "Explanation")]
    explanation: String,
    /// Internal diagnostic detail for local logs.
    #[serde(skip)]
    detail: Option<String>,
}

impl RequestError {
    /// Creates a request error of the given kind.
    #[must_use]
    pub fn new(kind: RequestErrorKind, explanation: impl Into<String>) -> Self {
        Self {
            kind,
            explanation: explanation.into(),
            detail: None,
        }
    }

    /// Creates a client-fault error for invalid input.
    #[must_use]
    pub fn bad_request(explanation: impl Into<String>) -> Self {
        Self::new(RequestErrorKind::BadRequest, explanation)
    }

    /// Creates a client-fault error for unmatched endpoints.
    #[must_use]
    pub fn not_found(explanation: impl Into<String>) -> Self {
        Self::new(RequestErrorKind::NotFound, explanation)
    }

    /// Creates a client-fault error for a rejected method.
    #[must_use]
    pub fn method_not_allowed(explanation: impl Into<String>) -> Self {
        Self::new(RequestErrorKind::MethodNotAllowed, explanation)
    }

    /// Creates a server-fault error.
    #[must_use]
    pub fn internal(explanation: impl Into<String>) -> Self {
        Self::new(RequestErrorKind::Internal, explanation)
    }

    /// Attaches internal diagnostic detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> RequestErrorKind {
        self.kind
    }

    /// Returns who is at fault.
    #[must_use]
    pub const fn fault(&self) -> Fault {
        self.kind.fault()
    }

    /// Returns the client-facing explanation.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Returns the internal diagnostic detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Encodes the wire body, falling back to a fixed payload on failure.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| FALLBACK_ERROR_BODY.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use super::*;

    #[test]
    fn wire_body_carries_only_the_explanation() {
        let error = RequestError::internal("Could not insert run set")
            .with_detail("UNIQUE constraint failed: run_sets.id");
        assert_eq!(error.to_json(), "{\"Explanation\":\"Could not insert run set\"}");
        assert_eq!(error.detail(), Some("UNIQUE constraint failed: run_sets.id"));
    }

    #[test]
    fn kinds_map_to_faults() {
        assert_eq!(RequestError::bad_request("x").fault(), Fault::Client);
        assert_eq!(RequestError::not_found("x").fault(), Fault::Client);
        assert_eq!(RequestError::method_not_allowed("x").fault(), Fault::Client);
        assert_eq!(RequestError::internal("x").fault(), Fault::Server);
    }

    #[test]
    fn explanation_is_escaped() {
        let error = RequestError::bad_request("Benchmark does not exist: \"quoted\"");
        let decoded: serde_json::Value = serde_json::from_str(&error.to_json()).unwrap();
        assert_eq!(decoded["Explanation"], "Benchmark does not exist: \"quoted\"");
    }
}
