//! Read-only aggregate views consumed by the presentation layer.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use ticket_store::{invoice, ticket, today, LedgerStats, TicketStats};
use triage_core::Ticket;

use crate::auth;
use crate::error::Result;
use crate::state::AppState;

/// Combined dashboard aggregates.
#[derive(Serialize)]
pub struct StatsResponse {
    pub tickets: TicketStats,
    pub invoices: LedgerStats,
}

/// `GET /api/stats` (manager/admin)
pub async fn stats_api(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>> {
    auth::require_supervisor(&state, &headers)?;

    let pool = state.store.pool();
    let tickets = ticket::ticket_stats(pool).await?;
    let invoices = invoice::ledger_stats(pool, &today()).await?;

    Ok(Json(StatsResponse { tickets, invoices }))
}

/// `GET /api/review_queue` (manager/admin)
///
/// Closed tickets still awaiting manager confirmation.
pub async fn review_queue_api(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Ticket>>> {
    auth::require_supervisor(&state, &headers)?;

    let queue = ticket::review_queue(state.store.pool()).await?;
    Ok(Json(queue))
}

/// `GET /api/my_tickets` (any logged-in member)
///
/// The caller's own open workload.
pub async fn my_tickets_api(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Ticket>>> {
    let session = auth::require_session(&state, &headers)?;

    let mine = ticket::tickets_for_assignee(state.store.pool(), &session.name).await?;
    Ok(Json(mine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{state_with_recorder, supervisor_headers};
    use ticket_store::now_timestamp;
    use triage_core::{AutoStatus, TicketStatus};

    fn ticket(id: &str, status: TicketStatus, auto: Option<AutoStatus>) -> Ticket {
        Ticket {
            id: id.to_string(),
            description: "d".to_string(),
            status,
            ticket_type: None,
            assigned_team: None,
            assigned_to: None,
            requester_name: None,
            requester_email: None,
            auto_status: auto,
            ai_response: None,
            admin_review_needed: false,
            created_at: now_timestamp(),
            updated_at: None,
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_stats_counts_review_queue() {
        let (state, _) = state_with_recorder().await;
        let pool = state.store.pool();

        ticket::insert_ticket(pool, &ticket("T1", TicketStatus::Open, None)).await.unwrap();
        ticket::insert_ticket(
            pool,
            &ticket("T2", TicketStatus::Closed, Some(AutoStatus::AutoResolved)),
        )
        .await
        .unwrap();
        ticket::insert_ticket(
            pool,
            &ticket("T3", TicketStatus::Closed, Some(AutoStatus::ManagerReviewed)),
        )
        .await
        .unwrap();

        let headers = supervisor_headers(&state);
        let response = stats_api(State(state.clone()), headers).await.unwrap();
        assert_eq!(response.0.tickets.total, 3);
        assert_eq!(response.0.tickets.closed, 2);
        assert_eq!(response.0.tickets.review_queue, 1);

        let headers = supervisor_headers(&state);
        let queue = review_queue_api(State(state), headers).await.unwrap();
        assert_eq!(queue.0.len(), 1);
        assert_eq!(queue.0[0].id, "T2");
    }

    #[tokio::test]
    async fn test_my_tickets_shows_own_open_work() {
        let (state, _) = state_with_recorder().await;
        let pool = state.store.pool();

        let mut mine = ticket("T1", TicketStatus::Open, None);
        mine.assigned_to = Some("Maya Lopez".to_string());
        ticket::insert_ticket(pool, &mine).await.unwrap();

        let mut closed = ticket("T2", TicketStatus::Closed, None);
        closed.assigned_to = Some("Maya Lopez".to_string());
        ticket::insert_ticket(pool, &closed).await.unwrap();

        let mut other = ticket("T3", TicketStatus::Open, None);
        other.assigned_to = Some("Robert Brown".to_string());
        ticket::insert_ticket(pool, &other).await.unwrap();

        let headers = supervisor_headers(&state);
        let mine = my_tickets_api(State(state), headers).await.unwrap();
        let ids: Vec<&str> = mine.0.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1"]);
    }
}
