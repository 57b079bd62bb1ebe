//! Roster administration (admin only).

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use ticket_store::roster;
use triage_core::{Role, RosterEntry};

use crate::auth;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewRosterEntry {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub teams: Option<String>,
}

/// Roster member as exposed over the API. Passwords never leave the store.
#[derive(Serialize)]
pub struct RosterEntryView {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub teams: Option<String>,
}

impl From<RosterEntry> for RosterEntryView {
    fn from(entry: RosterEntry) -> Self {
        Self {
            email: entry.email,
            name: entry.name,
            role: entry.role,
            teams: entry.teams,
        }
    }
}

/// `POST /api/roster` (admin)
pub async fn add_roster_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<NewRosterEntry>,
) -> Result<Json<RosterEntryView>> {
    let session = auth::require_admin(&state, &headers)?;

    let email = req.email.trim().to_string();
    if email.is_empty() || req.password.trim().is_empty() || req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Required fields missing.".to_string()));
    }
    let role: Role = req
        .role
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid role: {}", req.role)))?;

    let entry = RosterEntry {
        email,
        password: req.password,
        name: req.name.trim().to_string(),
        role,
        teams: req.teams,
    };
    roster::add_entry(state.store.pool(), &entry).await?;
    info!(by = %session.email, added = %entry.email, role = role.as_str(), "Roster entry added");

    Ok(Json(entry.into()))
}

/// `GET /api/roster` (admin)
pub async fn list_roster(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RosterEntryView>>> {
    auth::require_admin(&state, &headers)?;

    let entries = roster::list_entries(state.store.pool()).await?;
    Ok(Json(entries.into_iter().map(RosterEntryView::from).collect()))
}
