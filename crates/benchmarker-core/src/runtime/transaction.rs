// crates/benchmarker-core/src/runtime/transaction.rs
// ============================================================================
// Module: Transaction Executor
// Description: Brackets one handler invocation in one store session.
// Purpose: Guarantee exactly one commit-or-rollback per request.
// Dependencies: crate::{interfaces, runtime::error}
// ============================================================================

//! ## Overview
//! [`execute_in_transaction`] begins a session, runs the handler exactly once,
//! and commits only when the handler both signals commit and succeeds. An
//! error always forces a rollback. The handler's success response is returned
//! as a value so the transport writes nothing until the session is resolved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::interfaces::SessionSource;
use crate::interfaces::StoreSession;
use crate::runtime::error::RequestError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Success status a handler responds with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessStatus {
    /// The submission was recorded (HTTP 201).
    Created,
}

/// Success response produced by a handler, written only after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// Success status.
    pub status: SuccessStatus,
    /// JSON response body.
    pub body: Vec<u8>,
}

impl HandlerResponse {
    /// Creates a `Created` response with the given JSON body.
    #[must_use]
    pub const fn created(body: Vec<u8>) -> Self {
        Self {
            status: SuccessStatus::Created,
            body,
        }
    }
}

/// What a handler hands back to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutcome {
    /// Commit signal; ignored when `result` is an error.
    pub commit: bool,
    /// Handler result.
    pub result: Result<HandlerResponse, RequestError>,
}

impl HandlerOutcome {
    /// Successful outcome that asks for a commit.
    #[must_use]
    pub const fn commit(response: HandlerResponse) -> Self {
        Self {
            commit: true,
            result: Ok(response),
        }
    }

    /// Failed outcome that asks for a rollback.
    #[must_use]
    pub const fn abort(error: RequestError) -> Self {
        Self {
            commit: false,
            result: Err(error),
        }
    }
}

impl From<Result<HandlerResponse, RequestError>> for HandlerOutcome {
    fn from(result: Result<HandlerResponse, RequestError>) -> Self {
        match result {
            Ok(response) => Self::commit(response),
            Err(error) => Self::abort(error),
        }
    }
}

/// How the session was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// No session was opened.
    NotStarted,
    /// The session was committed.
    Committed,
    /// The session was rolled back.
    RolledBack,
}

/// Result of running one handler inside one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    /// How the session was resolved.
    pub resolution: Resolution,
    /// Response to write, or the error to report.
    pub result: Result<HandlerResponse, RequestError>,
    /// Rollback failure detail, for local logging only.
    pub rollback_error: Option<String>,
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Runs `handler` once inside a fresh session from `source`.
///
/// - Failure to begin the session is a server fault; the handler is not run.
/// - The session commits iff the handler signals commit and returns success.
/// - A failed commit turns the outcome into a server fault.
/// - A failed rollback is recorded but never changes the reported result.
pub fn execute_in_transaction<S, F>(source: &S, handler: F) -> TransactionOutcome
where
    S: SessionSource + ?Sized,
    F: FnOnce(&mut dyn StoreSession) -> HandlerOutcome,
{
    let mut session = match source.begin() {
        Ok(session) => session,
        Err(err) => {
            return TransactionOutcome {
                resolution: Resolution::NotStarted,
                result: Err(RequestError::internal("Could not begin transaction").with_detail(err)),
                rollback_error: None,
            };
        }
    };

    let HandlerOutcome {
        commit,
        result,
    } = handler(session.as_mut());

    if commit && result.is_ok() {
        return match session.commit() {
            Ok(()) => TransactionOutcome {
                resolution: Resolution::Committed,
                result,
                rollback_error: None,
            },
            Err(err) => TransactionOutcome {
                resolution: Resolution::RolledBack,
                result: Err(
                    RequestError::internal("Could not commit transaction").with_detail(err)
                ),
                rollback_error: None,
            },
        };
    }

    let rollback_error = session.rollback().err().map(|err| err.to_string());
    TransactionOutcome {
        resolution: Resolution::RolledBack,
        result,
        rollback_error,
    }
}
