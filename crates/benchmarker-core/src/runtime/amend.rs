// crates/benchmarker-core/src/runtime/amend.rs
// ============================================================================
// Module: Amend Run Set Handler
// Description: Folds a partial submission into a stored run set.
// Purpose: Implement `POST /runset/<id>` independently of any transport.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! An amendment names the run set it extends in the request path and repeats
//! the run set's identifying fields in its body. Those fields must agree with
//! what is stored; only runs, timed-out and crashed benchmarks, log URLs, and
//! the finish time may change.
//!
//! Product references in the amendment are resolved through the catalog before
//! comparison, so a client may repeat the same commit prefix it used at
//! creation time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Product;
use crate::core::RunSet;
use crate::core::RunSetAmendment;
use crate::core::RunSetId;
use crate::interfaces::ReferenceCatalog;
use crate::interfaces::RunSetStore;
use crate::interfaces::StoreSession;
use crate::runtime::create::run_insert_error;
use crate::runtime::error::RequestError;
use crate::runtime::merge::merge_amendment;
use crate::runtime::transaction::HandlerOutcome;
use crate::runtime::transaction::HandlerResponse;
use crate::runtime::validation::ensure_benchmarks_and_metrics_exist;
use crate::runtime::validation::secondary_products_match;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path segment that prefixes run set identifiers.
const RUN_SET_SEGMENT: &str = "runset";

/// Success body for an amendment.
const AMENDED_BODY: &[u8] = b"{}";

// ============================================================================
// SECTION: Path Parsing
// ============================================================================

/// Extracts the run set identifier from a `/runset/<id>` path.
///
/// # Errors
///
/// Returns "Incorrect path" when the path does not have exactly the shape
/// `/runset/<id>`, and "Could not parse run set id" when `<id>` is not a
/// base-10 32-bit integer.
pub fn parse_run_set_path(path: &str) -> Result<RunSetId, RequestError> {
    let segments: Vec<&str> = path.split('/').collect();
    let [root, prefix, raw_id] = segments.as_slice() else {
        return Err(RequestError::bad_request("Incorrect path"));
    };
    if !root.is_empty() || *prefix != RUN_SET_SEGMENT {
        return Err(RequestError::bad_request("Incorrect path"));
    }
    raw_id.parse::<RunSetId>().map_err(|err| {
        RequestError::bad_request("Could not parse run set id").with_detail(err)
    })
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Handles an amendment of the run set addressed by `path` inside `session`.
///
/// Signals commit only when every step succeeded.
pub fn amend_run_set(session: &mut dyn StoreSession, path: &str, body: &[u8]) -> HandlerOutcome {
    amend(session, path, body).into()
}

/// Runs the amend pipeline, returning the first failure.
fn amend(
    session: &mut dyn StoreSession,
    path: &str,
    body: &[u8],
) -> Result<HandlerResponse, RequestError> {
    let id = parse_run_set_path(path)?;
    let amendment: RunSetAmendment = serde_json::from_slice(body).map_err(|err| {
        RequestError::bad_request("Could not parse request body").with_detail(err)
    })?;

    let stored = RunSetStore::fetch_run_set(&*session, id)
        .map_err(|err| RequestError::internal("Could not fetch run set").with_detail(err))?
        .ok_or_else(|| RequestError::bad_request(format!("Run set does not exist: {id}")))?;

    ensure_benchmarks_and_metrics_exist(
        &*session,
        &amendment.runs,
        &amendment.timed_out_benchmarks,
        &amendment.crashed_benchmarks,
    )?;
    if !identity_matches(&*session, &stored, &amendment)? {
        return Err(RequestError::bad_request("Parameters do not match database"));
    }

    let merged = merge_amendment(&stored, &amendment);
    RunSetStore::insert_runs(&mut *session, id, &amendment.runs).map_err(run_insert_error)?;
    RunSetStore::update_run_set(&mut *session, id, &merged)
        .map_err(|err| RequestError::internal("Could not update run set").with_detail(err))?;

    Ok(HandlerResponse::created(AMENDED_BODY.to_vec()))
}

// ============================================================================
// SECTION: Immutability
// ============================================================================

/// Returns true when the amendment's identifying fields equal the stored ones.
fn identity_matches<C: ReferenceCatalog + ?Sized>(
    catalog: &C,
    stored: &RunSet,
    amendment: &RunSetAmendment,
) -> Result<bool, RequestError> {
    if amendment.machine != stored.machine || amendment.config != stored.config {
        return Ok(false);
    }
    let Some(main_product) = resolve(catalog, &amendment.main_product)? else {
        return Ok(false);
    };
    if main_product != stored.main_product {
        return Ok(false);
    }
    let mut secondary = Vec::with_capacity(amendment.secondary_products.len());
    for product in &amendment.secondary_products {
        let Some(resolved) = resolve(catalog, product)? else {
            return Ok(false);
        };
        secondary.push(resolved);
    }
    Ok(secondary_products_match(&secondary, &stored.secondary_products))
}

/// Resolves a product reference to its full commit, or `None` when unknown.
fn resolve<C: ReferenceCatalog + ?Sized>(
    catalog: &C,
    product: &Product,
) -> Result<Option<Product>, RequestError> {
    let commit = catalog
        .resolve_product(product)
        .map_err(|err| RequestError::internal("Could not look up product").with_detail(err))?;
    Ok(commit.map(|commit| Product {
        name: product.name.clone(),
        commit: commit.as_str().to_string(),
    }))
}
