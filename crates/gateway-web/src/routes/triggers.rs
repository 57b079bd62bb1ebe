//! Batch-resolution and bulk-assignment triggers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use tracing::info;

use resolver::balance;
use resolver::balance::BulkAssignment;

use crate::auth;
use crate::error::Result;
use crate::state::AppState;

#[derive(Serialize)]
pub struct TriggerResponse {
    pub status: String,
}

/// `POST /api/process_tickets` (manager/admin)
///
/// Spawns the batch pass as a detached task and returns immediately.
/// Fire-and-forget: there is no channel back to the caller; progress is
/// observed by re-reading the store.
pub async fn process_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TriggerResponse>> {
    let session = auth::require_supervisor(&state, &headers)?;
    info!(by = %session.email, "Batch resolution triggered");

    let runner = state.runner.clone();
    tokio::spawn(async move {
        let results = runner.run().await;
        info!(processed = results.len(), "Background ticket processing finished");
    });

    Ok(Json(TriggerResponse {
        status: "started".to_string(),
    }))
}

/// `POST /api/assign_tickets` (manager/admin)
///
/// Assigns every open unassigned ticket to the least-loaded people.
pub async fn assign_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BulkAssignment>> {
    let session = auth::require_supervisor(&state, &headers)?;
    info!(by = %session.email, "Bulk assignment triggered");

    let result = balance::assign_open_unassigned(&state.store).await?;
    Ok(Json(result))
}
