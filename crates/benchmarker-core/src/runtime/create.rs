// crates/benchmarker-core/src/runtime/create.rs
// ============================================================================
// Module: Create Run Set Handler
// Description: Validates and records a fresh run set submission.
// Purpose: Implement `POST /runset` independently of any transport.
// Dependencies: serde, serde_json, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The create pipeline is strictly ordered: parse, machine, main product,
//! secondary products, benchmarks and metrics, config, header insert, run
//! insert, response. The first failing step wins. The header and the runs are
//! written through the same session, so a run insert failure also discards the
//! header once the executor rolls back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::RunSet;
use crate::core::RunSetId;
use crate::interfaces::RunSetStore;
use crate::interfaces::StoreError;
use crate::interfaces::StoreSession;
use crate::runtime::error::RequestError;
use crate::runtime::transaction::HandlerOutcome;
use crate::runtime::transaction::HandlerResponse;
use crate::runtime::validation::ensure_benchmarks_and_metrics_exist;
use crate::runtime::validation::ensure_config_exists;
use crate::runtime::validation::ensure_machine_exists;
use crate::runtime::validation::ensure_product_exists;

// ============================================================================
// SECTION: Response
// ============================================================================

/// Success body for a created run set.
#[derive(Debug, Serialize)]
struct CreatedBody {
    /// Identifier assigned by the store.
    #[serde(rename = "RunSetID")]
    run_set_id: RunSetId,
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Handles a create submission inside `session`.
///
/// Signals commit only when every step succeeded.
pub fn create_run_set(session: &mut dyn StoreSession, body: &[u8]) -> HandlerOutcome {
    create(session, body).into()
}

/// Runs the create pipeline, returning the first failure.
fn create(session: &mut dyn StoreSession, body: &[u8]) -> Result<HandlerResponse, RequestError> {
    let mut run_set: RunSet = serde_json::from_slice(body).map_err(|err| {
        RequestError::bad_request("Could not parse request body").with_detail(err)
    })?;

    ensure_machine_exists(&*session, &run_set.machine)?;
    run_set.main_product = ensure_product_exists(&*session, &run_set.main_product)?;
    run_set.secondary_products = run_set
        .secondary_products
        .iter()
        .map(|product| ensure_product_exists(&*session, product))
        .collect::<Result<Vec<_>, _>>()?;
    ensure_benchmarks_and_metrics_exist(
        &*session,
        &run_set.runs,
        &run_set.timed_out_benchmarks,
        &run_set.crashed_benchmarks,
    )?;
    ensure_config_exists(&*session, &run_set.config)?;

    let id = RunSetStore::insert_run_set(&mut *session, &run_set)
        .map_err(|err| RequestError::internal("Could not insert run set").with_detail(err))?;
    RunSetStore::insert_runs(&mut *session, id, &run_set.runs).map_err(run_insert_error)?;

    let body = serde_json::to_vec(&CreatedBody {
        run_set_id: id,
    })
    .map_err(|err| RequestError::internal("Could not produce JSON for response").with_detail(err))?;
    Ok(HandlerResponse::created(body))
}

/// Maps a run insert failure to the fault the store attributes it to.
pub(crate) fn run_insert_error(err: StoreError) -> RequestError {
    match err {
        StoreError::Invalid(reason) => {
            RequestError::bad_request("Could not insert runs").with_detail(reason)
        }
        other => RequestError::internal("Could not insert runs").with_detail(other),
    }
}
