// crates/benchmarker-http/src/server.rs
// ============================================================================
// Module: Ingest Server
// Description: HTTP routing and the per-request transaction wrapper.
// Purpose: Map HTTP requests onto the run set handlers with fixed semantics.
// Dependencies: benchmarker-core, benchmarker-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! All requests land in one wrapper. It resolves the route from the path,
//! rejects anything but `POST` before a session exists, reads the full body,
//! then runs the handler on the blocking pool through
//! [`benchmarker_core::execute_in_transaction`]. Nothing is written to the
//! client until the session is committed or rolled back. Security posture:
//! request bodies are untrusted and size-capped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use benchmarker_config::AuditConfig;
use benchmarker_config::BenchmarkerConfig;
use benchmarker_core::Fault;
use benchmarker_core::RequestError;
use benchmarker_core::RequestErrorKind;
use benchmarker_core::Resolution;
use benchmarker_core::SessionSource;
use benchmarker_core::SharedSessionSource;
use benchmarker_core::SuccessStatus;
use benchmarker_core::TransactionOutcome;
use benchmarker_core::amend_run_set;
use benchmarker_core::create_run_set;
use benchmarker_core::execute_in_transaction;
use benchmarker_store_sqlite::SqliteStore;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::RequestAuditEvent;
use crate::audit::RequestAuditEventParams;
use crate::audit::RequestAuditSink;
use crate::audit::RequestOutcome;
use crate::audit::StderrAuditSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path of the create endpoint.
const CREATE_PATH: &str = "/runset";
/// Path prefix of the amend endpoint.
const AMEND_PREFIX: &str = "/runset/";
/// Content type of every response body.
const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Routes
// ============================================================================

/// Endpoint a request path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `POST /runset`.
    Create,
    /// `POST /runset/<id>`; the id itself is checked by the handler.
    Amend,
}

impl Route {
    /// Resolves a request path, returning `None` for unknown endpoints.
    #[must_use]
    pub fn resolve(path: &str) -> Option<Self> {
        if path == CREATE_PATH {
            Some(Self::Create)
        } else if path.starts_with(AMEND_PREFIX) {
            Some(Self::Amend)
        } else {
            None
        }
    }

    /// Returns a stable label for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Amend => "amend",
        }
    }
}

// ============================================================================
// SECTION: Server State
// ============================================================================

/// Shared state for the request wrapper.
#[derive(Clone)]
pub struct ServerState {
    /// Session source for the run set store.
    source: SharedSessionSource,
    /// Audit sink receiving one event per request.
    audit: Arc<dyn RequestAuditSink>,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
}

impl ServerState {
    /// Creates server state from its collaborators.
    #[must_use]
    pub fn new(
        source: SharedSessionSource,
        audit: Arc<dyn RequestAuditSink>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            source,
            audit,
            max_body_bytes,
        }
    }
}

/// Builds the ingest router. Every path is handled by the request wrapper.
#[must_use]
pub fn build_router(state: ServerState) -> Router {
    Router::new().fallback(handle_request).with_state(Arc::new(state))
}

/// Serves the ingest router on an already bound listener.
///
/// # Errors
///
/// Returns [`ServerError::Transport`] when the server loop fails.
pub async fn serve_listener(listener: TcpListener, state: ServerState) -> Result<(), ServerError> {
    axum::serve(listener, build_router(state))
        .await
        .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
}

// ============================================================================
// SECTION: Ingest Server
// ============================================================================

/// Ingest server backed by the `SQLite` store.
pub struct IngestServer {
    /// Listen address.
    bind: SocketAddr,
    /// Request wrapper state.
    state: ServerState,
}

impl IngestServer {
    /// Builds a server from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the config is invalid or the store or
    /// audit sink cannot be opened.
    pub fn from_config(config: &BenchmarkerConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = SqliteStore::new(&config.store.sqlite_config())
            .map_err(|err| ServerError::Init(err.to_string()))?;
        store.check_connection().map_err(|err| ServerError::Init(err.to_string()))?;
        let source: SharedSessionSource = Arc::new(store);
        let audit = build_audit_sink(&config.audit)?;
        Ok(Self {
            bind,
            state: ServerState::new(source, audit, config.server.max_body_bytes),
        })
    }

    /// Returns the configured listen address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Binds the listen address and serves until the server loop fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        serve_listener(listener, self.state).await
    }
}

/// Selects the audit sink from configuration.
fn build_audit_sink(config: &AuditConfig) -> Result<Arc<dyn RequestAuditSink>, ServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(path)
                .map_err(|err| ServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Request Wrapper
// ============================================================================

/// Everything the wrapper knows once a request is resolved.
#[derive(Debug)]
struct Reply {
    /// Matched route, if any.
    route: Option<Route>,
    /// Status to write.
    status: StatusCode,
    /// Body to write.
    body: Vec<u8>,
    /// Store outcome.
    outcome: RequestOutcome,
    /// Request body size.
    request_bytes: usize,
    /// Error behind a non-success status.
    error: Option<RequestError>,
    /// Rollback failure detail.
    rollback_error: Option<String>,
}

impl Reply {
    /// Reply for a request refused before any session was opened.
    fn rejected(route: Option<Route>, error: RequestError) -> Self {
        Self {
            route,
            status: error_status(error.kind()),
            body: error.to_json().into_bytes(),
            outcome: RequestOutcome::Rejected,
            request_bytes: 0,
            error: Some(error),
            rollback_error: None,
        }
    }

    /// Reply for a request that reached the transaction executor.
    fn from_transaction(route: Route, outcome: TransactionOutcome, request_bytes: usize) -> Self {
        let store_outcome = match outcome.resolution {
            Resolution::NotStarted => RequestOutcome::Rejected,
            Resolution::Committed => RequestOutcome::Committed,
            Resolution::RolledBack => RequestOutcome::RolledBack,
        };
        let (status, body, error) = match outcome.result {
            Ok(response) => (success_status(response.status), response.body, None),
            Err(error) => (error_status(error.kind()), error.to_json().into_bytes(), Some(error)),
        };
        Self {
            route: Some(route),
            status,
            body,
            outcome: store_outcome,
            request_bytes,
            error,
            rollback_error: outcome.rollback_error,
        }
    }

    /// Builds the audit event describing this reply.
    fn audit_event(&self, method: &Method, path: &str) -> RequestAuditEvent {
        let explanation = self.error.as_ref().map(|error| error.explanation().to_string());
        let detail = self
            .error
            .as_ref()
            .filter(|error| error.fault() == Fault::Server)
            .and_then(|error| error.detail().map(str::to_string));
        RequestAuditEvent::new(RequestAuditEventParams {
            method: method.as_str().to_string(),
            path: path.to_string(),
            route: self.route.map(Route::as_str),
            status: self.status.as_u16(),
            outcome: self.outcome,
            request_bytes: self.request_bytes,
            response_bytes: self.body.len(),
            explanation,
            detail,
            rollback_error: self.rollback_error.clone(),
        })
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))], self.body)
            .into_response()
    }
}

/// Axum entry point for every request.
async fn handle_request(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    body: Body,
) -> Response {
    let path = uri.path().to_string();
    let reply = dispatch(&state, &method, &path, body).await;
    state.audit.record(&reply.audit_event(&method, &path));
    reply.into_response()
}

/// Runs the wrapper steps for one request.
async fn dispatch(state: &ServerState, method: &Method, path: &str, body: Body) -> Reply {
    let Some(route) = Route::resolve(path) else {
        return Reply::rejected(None, RequestError::not_found("No such endpoint"));
    };
    if *method != Method::POST {
        return Reply::rejected(
            Some(route),
            RequestError::method_not_allowed("Only POST method allowed"),
        );
    }
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return Reply::rejected(
                Some(route),
                RequestError::internal("Could not read request body").with_detail(err),
            );
        }
    };
    let request_bytes = bytes.len();
    let source = Arc::clone(&state.source);
    let owned_path = path.to_string();
    let joined = tokio::task::spawn_blocking(move || {
        run_route(source.as_ref(), route, &owned_path, &bytes)
    })
    .await;
    match joined {
        Ok(outcome) => Reply::from_transaction(route, outcome, request_bytes),
        Err(err) => {
            let error = RequestError::internal("Could not process request").with_detail(err);
            Reply::from_transaction(
                route,
                TransactionOutcome {
                    resolution: Resolution::RolledBack,
                    result: Err(error),
                    rollback_error: None,
                },
                request_bytes,
            )
        }
    }
}

/// Runs the route's handler inside one store session.
fn run_route(source: &dyn SessionSource, route: Route, path: &str, body: &[u8]) -> TransactionOutcome {
    match route {
        Route::Create => execute_in_transaction(source, |session| create_run_set(session, body)),
        Route::Amend => {
            execute_in_transaction(source, |session| amend_run_set(session, path, body))
        }
    }
}

/// Maps an error kind onto its HTTP status.
const fn error_status(kind: RequestErrorKind) -> StatusCode {
    match kind {
        RequestErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        RequestErrorKind::NotFound => StatusCode::NOT_FOUND,
        RequestErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        RequestErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps a handler success status onto its HTTP status.
const fn success_status(status: SuccessStatus) -> StatusCode {
    match status {
        SuccessStatus::Created => StatusCode::CREATED,
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ingest server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
