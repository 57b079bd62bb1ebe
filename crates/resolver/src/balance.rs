//! Workload balancing.
//!
//! Assignment targets the roster of everyone who has ever held a ticket,
//! picking whoever currently has the fewest open tickets. Tie-break:
//! lowest open count, then name in ascending order.

use tracing::{info, warn};

use ticket_store::{ticket, Result, Store, TicketPatch};

/// Assign one ticket to the least-loaded candidate.
///
/// Returns the chosen name, or `None` when there is no candidate pool or
/// the ticket does not exist.
pub async fn assign_ticket(store: &Store, ticket_id: &str) -> Result<Option<String>> {
    let workload = ticket::workload_counts(store.pool()).await?;
    let Some((name, open_count)) = workload.into_iter().next() else {
        warn!(ticket = %ticket_id, "No assignment candidates available");
        return Ok(None);
    };

    let patch = TicketPatch::new().assigned_to(name.clone());
    if ticket::update_ticket(store.pool(), ticket_id, &patch).await? {
        info!(ticket = %ticket_id, assignee = %name, open_count, "Ticket assigned");
        Ok(Some(name))
    } else {
        warn!(ticket = %ticket_id, "Assignment target ticket not found");
        Ok(None)
    }
}

/// Outcome of a bulk assignment pass.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BulkAssignment {
    /// Tickets assigned in this pass.
    pub assigned: usize,
    /// Open-ticket counts per candidate after the pass.
    pub workload: Vec<(String, i64)>,
}

/// Assign every open unassigned ticket, balancing as it goes.
///
/// The workload map is built once and incremented in memory per
/// assignment, which guarantees round-robin-toward-balance within one
/// call, not global optimality.
pub async fn assign_open_unassigned(store: &Store) -> Result<BulkAssignment> {
    let mut workload = ticket::workload_counts(store.pool()).await?;
    if workload.is_empty() {
        warn!("No assignment candidates available");
        return Ok(BulkAssignment {
            assigned: 0,
            workload,
        });
    }

    let targets = ticket::open_unassigned_tickets(store.pool()).await?;
    info!(unassigned = targets.len(), candidates = workload.len(), "Bulk assignment");

    let mut assigned = 0;
    for target in targets {
        let best = least_loaded(&workload);
        let (name, _) = &workload[best];
        let patch = TicketPatch::new().assigned_to(name.clone());

        if ticket::update_ticket(store.pool(), &target.id, &patch).await? {
            info!(ticket = %target.id, assignee = %workload[best].0, "Ticket assigned");
            workload[best].1 += 1;
            assigned += 1;
        } else {
            warn!(ticket = %target.id, "Assignment target disappeared, skipping");
        }
    }

    Ok(BulkAssignment { assigned, workload })
}

/// Index of the candidate with the fewest open tickets, name ascending on
/// ties.
fn least_loaded(workload: &[(String, i64)]) -> usize {
    let mut best = 0;
    for (i, (name, count)) in workload.iter().enumerate().skip(1) {
        let (best_name, best_count) = &workload[best];
        if count < best_count || (count == best_count && name < best_name) {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticket_store::now_timestamp;
    use triage_core::{Ticket, TicketStatus};

    async fn test_store() -> Store {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn ticket(id: &str, status: TicketStatus, assignee: Option<&str>) -> Ticket {
        Ticket {
            id: id.to_string(),
            description: "desc".to_string(),
            status,
            ticket_type: None,
            assigned_team: None,
            assigned_to: assignee.map(str::to_string),
            requester_name: None,
            requester_email: None,
            auto_status: None,
            ai_response: None,
            admin_review_needed: false,
            created_at: now_timestamp(),
            updated_at: None,
            closed_at: None,
        }
    }

    async fn seed(store: &Store, tickets: &[Ticket]) {
        for t in tickets {
            ticket_store::ticket::insert_ticket(store.pool(), t).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_single_assignment_picks_least_loaded() {
        let store = test_store().await;
        seed(
            &store,
            &[
                ticket("T1", TicketStatus::Open, Some("bella")),
                ticket("T2", TicketStatus::Open, Some("bella")),
                ticket("T3", TicketStatus::Closed, Some("adam")),
                ticket("T4", TicketStatus::Open, None),
            ],
        )
        .await;

        let assigned = assign_ticket(&store, "T4").await.unwrap();
        assert_eq!(assigned.as_deref(), Some("adam"));

        let t4 = ticket_store::ticket::get_ticket(store.pool(), "T4").await.unwrap();
        assert_eq!(t4.assigned_to.as_deref(), Some("adam"));
    }

    #[tokio::test]
    async fn test_no_candidate_pool_reports_none() {
        let store = test_store().await;
        seed(&store, &[ticket("T1", TicketStatus::Open, None)]).await;

        assert_eq!(assign_ticket(&store, "T1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bulk_balances_toward_even_load() {
        // Candidate pool {a: 0 open, b: 2 open}: the first assignment must
        // go to `a`, then loads even out.
        let store = test_store().await;
        seed(
            &store,
            &[
                ticket("T1", TicketStatus::Open, Some("b")),
                ticket("T2", TicketStatus::Open, Some("b")),
                ticket("T3", TicketStatus::Closed, Some("a")),
                ticket("T10", TicketStatus::Open, None),
                ticket("T11", TicketStatus::Open, None),
                ticket("T12", TicketStatus::Open, None),
            ],
        )
        .await;

        let result = assign_open_unassigned(&store).await.unwrap();
        assert_eq!(result.assigned, 3);

        let t10 = ticket_store::ticket::get_ticket(store.pool(), "T10").await.unwrap();
        assert_eq!(t10.assigned_to.as_deref(), Some("a"));

        // a takes T10 and T11 to catch up, then wins the 2-2 tie by name.
        let mut workload = result.workload;
        workload.sort();
        assert_eq!(workload, vec![("a".to_string(), 3), ("b".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_tie_break_is_name_order() {
        let store = test_store().await;
        seed(
            &store,
            &[
                ticket("T1", TicketStatus::Closed, Some("zoe")),
                ticket("T2", TicketStatus::Closed, Some("amy")),
                ticket("T3", TicketStatus::Open, None),
            ],
        )
        .await;

        // Both candidates have zero open tickets; the name decides.
        let assigned = assign_ticket(&store, "T3").await.unwrap();
        assert_eq!(assigned.as_deref(), Some("amy"));
    }
}
