//! Route handlers for the gateway.

pub mod approval;
pub mod health;
pub mod roster_admin;
pub mod session;
pub mod stats;
pub mod triggers;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Signed approval links delivered by email
        .route("/ticket/approve/:ticket_id", get(approval::approve_ticket))
        .route("/ticket/reject/:ticket_id", get(approval::reject_ticket))
        // Authenticated review path for the dashboard
        .route(
            "/review_ticket_action/:ticket_id",
            post(approval::review_ticket_action),
        )
        // Health check
        .route("/health", get(health::health))
        // Sessions
        .route("/api/login", post(session::login))
        .route("/api/logout", post(session::logout))
        // Triggers
        .route("/api/process_tickets", post(triggers::process_tickets))
        .route("/api/assign_tickets", post(triggers::assign_tickets))
        // Read-only aggregate views
        .route("/api/stats", get(stats::stats_api))
        .route("/api/review_queue", get(stats::review_queue_api))
        .route("/api/my_tickets", get(stats::my_tickets_api))
        // Roster administration
        .route(
            "/api/roster",
            get(roster_admin::list_roster).post(roster_admin::add_roster_entry),
        )
}
