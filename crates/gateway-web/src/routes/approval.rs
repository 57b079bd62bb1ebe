//! Approval gateway: signed approve/reject links and the authenticated
//! review path.
//!
//! An invalid token never mutates state. A second approve or reject of a
//! ticket that is no longer pending is an explicit "already handled"
//! no-op, not a repeat of its effects.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use resolver::balance;
use ticket_store::{now_timestamp, ticket, TicketPatch};
use triage_core::{token, AutoStatus, Directory, Notification, Ticket, TicketStatus};

use crate::auth;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Manager decision delivered from the dashboard.
#[derive(Deserialize)]
pub struct ReviewAction {
    pub action: String,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub assigned_to: Option<String>,
}

/// `GET /ticket/approve/{ticket_id}?token=...`
///
/// Close a pending ticket on a manager's approval and notify the original
/// requester with the stored agent response.
pub async fn approve_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<String>> {
    verify_link_token(&state, &ticket_id, query.token.as_deref())?;

    let ticket = ticket::get_ticket(state.store.pool(), &ticket_id).await?;
    if ticket.status != TicketStatus::PendingApproval {
        info!(ticket = %ticket_id, "Approve link used on a ticket no longer pending");
        return Ok(already_handled_page(&ticket_id));
    }

    let patch = TicketPatch::new()
        .status(TicketStatus::Closed)
        .auto_status(AutoStatus::ManagerReviewed)
        .admin_review_needed(false)
        .closed_at(now_timestamp());

    if !ticket::update_ticket(state.store.pool(), &ticket_id, &patch).await? {
        return Err(AppError::Internal("Failed to update ticket.".to_string()));
    }

    notify_requester_closed(&state, &ticket).await;

    Ok(Html(format!(
        "<h2>Ticket {} Approved</h2>\n<p>The ticket has been successfully closed.</p>",
        ticket_id
    )))
}

/// `GET /ticket/reject/{ticket_id}?token=...`
///
/// Reopen a pending ticket on a manager's rejection and hand it to the
/// least-loaded person.
pub async fn reject_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<String>> {
    verify_link_token(&state, &ticket_id, query.token.as_deref())?;

    let ticket = ticket::get_ticket(state.store.pool(), &ticket_id).await?;
    if ticket.status != TicketStatus::PendingApproval {
        info!(ticket = %ticket_id, "Reject link used on a ticket no longer pending");
        return Ok(already_handled_page(&ticket_id));
    }

    let patch = TicketPatch::new()
        .status(TicketStatus::Open)
        .auto_status(AutoStatus::ManagerReviewed)
        .admin_review_needed(false);

    if !ticket::update_ticket(state.store.pool(), &ticket_id, &patch).await? {
        return Err(AppError::Internal("Failed to update ticket.".to_string()));
    }

    match balance::assign_ticket(&state.store, &ticket_id).await? {
        Some(assignee) => Ok(Html(format!(
            "<h2>Ticket {} Reopened</h2>\n<p>The ticket has been reopened and assigned to <b>{}</b>.</p>",
            ticket_id, assignee
        ))),
        None => Ok(Html(format!(
            "<h2>Ticket {} Reopened</h2>\n<p>The ticket is open but could not be auto-assigned.</p>",
            ticket_id
        ))),
    }
}

/// `POST /review_ticket_action/{ticket_id}`
///
/// Logged-in manager/admin decision on an auto-resolved ticket:
/// `confirm_closed` drops it from the review queue, `reopen` sets it back
/// to open and triggers the balancer. No token required on this path.
pub async fn review_ticket_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<String>,
    Json(req): Json<ReviewAction>,
) -> Result<Json<ReviewResponse>> {
    auth::require_supervisor(&state, &headers)?;

    match req.action.as_str() {
        "confirm_closed" => {
            let patch = TicketPatch::new()
                .clear_auto_status()
                .admin_review_needed(false);
            if !ticket::update_ticket(state.store.pool(), &ticket_id, &patch).await? {
                return Err(AppError::NotFound(format!("Ticket not found: {}", ticket_id)));
            }
            Ok(Json(ReviewResponse {
                message: format!(
                    "Ticket {} confirmed closed - no longer pending review.",
                    ticket_id
                ),
                assigned_to: None,
            }))
        }
        "reopen" => {
            let patch = TicketPatch::new()
                .status(TicketStatus::Open)
                .clear_auto_status()
                .admin_review_needed(false);
            if !ticket::update_ticket(state.store.pool(), &ticket_id, &patch).await? {
                return Err(AppError::NotFound(format!("Ticket not found: {}", ticket_id)));
            }

            let assigned = balance::assign_ticket(&state.store, &ticket_id).await?;
            let message = match &assigned {
                Some(name) => format!("Ticket {} has been reopened. Assigned to {}.", ticket_id, name),
                None => format!(
                    "Ticket {} has been reopened. Could not auto-assign at this time.",
                    ticket_id
                ),
            };
            Ok(Json(ReviewResponse {
                message,
                assigned_to: assigned,
            }))
        }
        other => Err(AppError::BadRequest(format!("Invalid action: {}", other))),
    }
}

fn verify_link_token(state: &AppState, ticket_id: &str, presented: Option<&str>) -> Result<()> {
    let presented = presented.unwrap_or_default();
    if !token::verify(ticket_id, presented, &state.approval_secret) {
        warn!(ticket = %ticket_id, "Approval link rejected: token mismatch");
        return Err(AppError::Forbidden(
            "Invalid or expired approval link.".to_string(),
        ));
    }
    Ok(())
}

fn already_handled_page(ticket_id: &str) -> Html<String> {
    Html(format!(
        "<h2>Ticket {} already handled</h2>\n<p>No further action was taken.</p>",
        ticket_id
    ))
}

/// Tell the requester their ticket was closed, using the stored agent
/// response. Send failures are logged, never surfaced to the manager.
async fn notify_requester_closed(state: &AppState, ticket: &Ticket) {
    let recipient = requester_email(state, ticket).await;
    let Some(recipient) = recipient else {
        info!(ticket = %ticket.id, "No requester email on file for approval notification");
        return;
    };

    let response = ticket
        .ai_response
        .clone()
        .unwrap_or_else(|| "Your ticket has been processed by the query management agent.".to_string());
    let greeting = ticket
        .requester_name
        .as_deref()
        .or(ticket.assigned_to.as_deref())
        .unwrap_or("there");
    let body = format!(
        "Hello {},\n\n{}\n\nTicket ID: {}\nStatus: Closed\n\n\
         Regards,\nQuerydesk Query Management System",
        greeting, response, ticket.id
    );

    let note = Notification::new(recipient, format!("Ticket {} Resolved", ticket.id), body);
    if let Err(err) = state.notifier.send(&note).await {
        warn!(ticket = %ticket.id, error = %err, "Approval notification failed");
    }
}

/// Best-effort requester address, mirroring the resolution engine's order:
/// explicit field, requester name, assigned person.
async fn requester_email(state: &AppState, ticket: &Ticket) -> Option<String> {
    if let Some(email) = ticket.requester_email.as_deref() {
        let email = email.trim();
        if !email.is_empty() {
            return Some(email.to_string());
        }
    }
    if let Some(name) = ticket.requester_name.as_deref() {
        if let Some(email) = Directory::email_for_name(&state.store, name).await {
            return Some(email);
        }
    }
    if let Some(name) = ticket.assigned_to.as_deref() {
        if let Some(email) = Directory::email_for_name(&state.store, name).await {
            return Some(email);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::testutil::{state_with_recorder, supervisor_headers};
    use triage_core::Role;

    fn pending_ticket(id: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            description: "Please submit an early payment request".to_string(),
            status: TicketStatus::PendingApproval,
            ticket_type: Some("Accounts Payable".to_string()),
            assigned_team: Some("AP".to_string()),
            assigned_to: Some("Robert Brown".to_string()),
            requester_name: Some("Alice Green".to_string()),
            requester_email: Some("alice@example.com".to_string()),
            auto_status: Some(AutoStatus::AutoResolved),
            ai_response: Some("Early payment request validated.".to_string()),
            admin_review_needed: true,
            created_at: now_timestamp(),
            updated_at: None,
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_tampered_token_rejected_without_effects() {
        let (state, recorder) = state_with_recorder().await;
        ticket::insert_ticket(state.store.pool(), &pending_ticket("T102")).await.unwrap();

        let result = approve_ticket(
            State(state.clone()),
            Path("T102".to_string()),
            Query(TokenQuery {
                token: Some("deadbeef".to_string()),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let stored = ticket::get_ticket(state.store.pool(), "T102").await.unwrap();
        assert_eq!(stored.status, TicketStatus::PendingApproval);
        assert!(recorder.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_approve_closes_and_notifies_requester() {
        let (state, recorder) = state_with_recorder().await;
        ticket::insert_ticket(state.store.pool(), &pending_ticket("T102")).await.unwrap();

        let minted = token::mint("T102", &state.approval_secret);
        approve_ticket(
            State(state.clone()),
            Path("T102".to_string()),
            Query(TokenQuery {
                token: Some(minted),
            }),
        )
        .await
        .unwrap();

        let stored = ticket::get_ticket(state.store.pool(), "T102").await.unwrap();
        assert_eq!(stored.status, TicketStatus::Closed);
        assert_eq!(stored.auto_status, Some(AutoStatus::ManagerReviewed));
        assert!(!stored.admin_review_needed);
        assert!(stored.closed_at.is_some());

        let sent = recorder.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert!(sent[0].body.contains("Early payment request validated."));
    }

    #[tokio::test]
    async fn test_second_approve_is_a_noop() {
        let (state, recorder) = state_with_recorder().await;
        ticket::insert_ticket(state.store.pool(), &pending_ticket("T102")).await.unwrap();

        let minted = token::mint("T102", &state.approval_secret);
        for _ in 0..2 {
            approve_ticket(
                State(state.clone()),
                Path("T102".to_string()),
                Query(TokenQuery {
                    token: Some(minted.clone()),
                }),
            )
            .await
            .unwrap();
        }

        // The second pass re-sent nothing.
        assert_eq!(recorder.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reject_reopens_and_assigns_once() {
        let (state, _) = state_with_recorder().await;
        ticket::insert_ticket(state.store.pool(), &pending_ticket("T102")).await.unwrap();
        // A candidate pool: Robert holds the only other (closed) ticket.
        let mut other = pending_ticket("T900");
        other.status = TicketStatus::Closed;
        other.auto_status = None;
        ticket::insert_ticket(state.store.pool(), &other).await.unwrap();

        let minted = token::mint("T102", &state.approval_secret);
        let page = reject_ticket(
            State(state.clone()),
            Path("T102".to_string()),
            Query(TokenQuery {
                token: Some(minted),
            }),
        )
        .await
        .unwrap();

        let stored = ticket::get_ticket(state.store.pool(), "T102").await.unwrap();
        assert_eq!(stored.status, TicketStatus::Open);
        assert_eq!(stored.auto_status, Some(AutoStatus::ManagerReviewed));
        assert_eq!(stored.assigned_to.as_deref(), Some("Robert Brown"));
        assert!(page.0.contains("Reopened"));
    }

    #[tokio::test]
    async fn test_review_requires_supervisor() {
        let (state, _) = state_with_recorder().await;
        ticket::insert_ticket(state.store.pool(), &pending_ticket("T1")).await.unwrap();

        // No session at all.
        let result = review_ticket_action(
            State(state.clone()),
            HeaderMap::new(),
            Path("T1".to_string()),
            Json(ReviewAction {
                action: "confirm_closed".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));

        // An employee session is not enough.
        let employee = state.sessions.create(Session {
            email: "e@example.com".to_string(),
            name: "E".to_string(),
            role: Role::Employee,
        });
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", employee).parse().unwrap(),
        );
        let result = review_ticket_action(
            State(state.clone()),
            headers,
            Path("T1".to_string()),
            Json(ReviewAction {
                action: "confirm_closed".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_review_confirm_clears_marker() {
        let (state, _) = state_with_recorder().await;
        let mut ticket_row = pending_ticket("T5");
        ticket_row.status = TicketStatus::Closed;
        ticket::insert_ticket(state.store.pool(), &ticket_row).await.unwrap();

        let headers = supervisor_headers(&state);
        let response = review_ticket_action(
            State(state.clone()),
            headers,
            Path("T5".to_string()),
            Json(ReviewAction {
                action: "confirm_closed".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(response.0.message.contains("confirmed closed"));

        let stored = ticket::get_ticket(state.store.pool(), "T5").await.unwrap();
        assert_eq!(stored.status, TicketStatus::Closed);
        assert_eq!(stored.auto_status, None);
    }

    #[tokio::test]
    async fn test_review_reopen_triggers_balancer() {
        let (state, _) = state_with_recorder().await;
        let mut ticket_row = pending_ticket("T6");
        ticket_row.status = TicketStatus::Closed;
        ticket::insert_ticket(state.store.pool(), &ticket_row).await.unwrap();

        let headers = supervisor_headers(&state);
        let response = review_ticket_action(
            State(state.clone()),
            headers,
            Path("T6".to_string()),
            Json(ReviewAction {
                action: "reopen".to_string(),
            }),
        )
        .await
        .unwrap();

        let stored = ticket::get_ticket(state.store.pool(), "T6").await.unwrap();
        assert_eq!(stored.status, TicketStatus::Open);
        assert_eq!(stored.auto_status, None);
        // T6's own previous assignee is the only candidate.
        assert_eq!(response.0.assigned_to.as_deref(), Some("Robert Brown"));
    }

    #[tokio::test]
    async fn test_invalid_review_action_rejected() {
        let (state, _) = state_with_recorder().await;
        let headers = supervisor_headers(&state);
        let result = review_ticket_action(
            State(state.clone()),
            headers,
            Path("T1".to_string()),
            Json(ReviewAction {
                action: "archive".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
