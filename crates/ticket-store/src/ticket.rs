//! Ticket CRUD and queries.

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use triage_core::{AutoStatus, Ticket, TicketStatus};

use crate::error::{Result, StoreError};
use crate::patch::{MarkerChange, TicketPatch};
use crate::now_timestamp;

/// Raw ticket row as stored. Converted to [`Ticket`] at the boundary so
/// enum parsing happens in exactly one place.
#[derive(Debug, FromRow)]
struct TicketRow {
    id: String,
    description: String,
    status: String,
    ticket_type: Option<String>,
    assigned_team: Option<String>,
    assigned_to: Option<String>,
    requester_name: Option<String>,
    requester_email: Option<String>,
    auto_status: Option<String>,
    ai_response: Option<String>,
    admin_review_needed: i64,
    created_at: String,
    updated_at: Option<String>,
    closed_at: Option<String>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Ticket> {
        let status = TicketStatus::from_str(&row.status)?;
        let auto_status = match row.auto_status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(AutoStatus::from_str(raw)?),
        };
        Ok(Ticket {
            id: row.id,
            description: row.description,
            status,
            ticket_type: row.ticket_type,
            assigned_team: row.assigned_team,
            assigned_to: row.assigned_to,
            requester_name: row.requester_name,
            requester_email: row.requester_email,
            auto_status,
            ai_response: row.ai_response,
            admin_review_needed: row.admin_review_needed != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            closed_at: row.closed_at,
        })
    }
}

const TICKET_COLUMNS: &str = "id, description, status, ticket_type, assigned_team, assigned_to, \
     requester_name, requester_email, auto_status, ai_response, admin_review_needed, \
     created_at, updated_at, closed_at";

/// Insert a new ticket.
pub async fn insert_ticket(pool: &SqlitePool, ticket: &Ticket) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tickets (id, description, status, ticket_type, assigned_team, assigned_to,
                             requester_name, requester_email, auto_status, ai_response,
                             admin_review_needed, created_at, updated_at, closed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&ticket.id)
    .bind(&ticket.description)
    .bind(ticket.status.as_str())
    .bind(&ticket.ticket_type)
    .bind(&ticket.assigned_team)
    .bind(&ticket.assigned_to)
    .bind(&ticket.requester_name)
    .bind(&ticket.requester_email)
    .bind(ticket.auto_status.map(|m| m.as_str()))
    .bind(&ticket.ai_response)
    .bind(ticket.admin_review_needed as i64)
    .bind(&ticket.created_at)
    .bind(&ticket.updated_at)
    .bind(&ticket.closed_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return StoreError::AlreadyExists {
                    entity: "Ticket",
                    id: ticket.id.clone(),
                };
            }
        }
        StoreError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a ticket by id.
pub async fn get_ticket(pool: &SqlitePool, id: &str) -> Result<Ticket> {
    let row = sqlx::query_as::<_, TicketRow>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?"
    ))
    .bind(id.trim())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound {
        entity: "Ticket",
        id: id.to_string(),
    })?;

    row.try_into()
}

/// A person's open workload: everything assigned to them that is not
/// closed yet.
pub async fn tickets_for_assignee(pool: &SqlitePool, name: &str) -> Result<Vec<Ticket>> {
    let rows = sqlx::query_as::<_, TicketRow>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets \
         WHERE LOWER(TRIM(assigned_to)) = LOWER(TRIM(?)) AND status != 'closed' \
         ORDER BY id"
    ))
    .bind(name)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Ticket::try_from).collect()
}

/// Tickets eligible for the automated batch pass: not closed, and never
/// touched by it (auto-resolution marker unset). This is the
/// at-most-one-automated-attempt invariant.
pub async fn eligible_tickets(pool: &SqlitePool) -> Result<Vec<Ticket>> {
    let rows = sqlx::query_as::<_, TicketRow>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets \
         WHERE LOWER(status) != 'closed' \
           AND (auto_status IS NULL OR TRIM(auto_status) = '') \
         ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Ticket::try_from).collect()
}

/// The review queue: closed tickets still awaiting manager confirmation.
pub async fn review_queue(pool: &SqlitePool) -> Result<Vec<Ticket>> {
    let rows = sqlx::query_as::<_, TicketRow>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets \
         WHERE status = 'closed' AND auto_status = 'auto_resolved' \
         ORDER BY updated_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Ticket::try_from).collect()
}

/// Apply a multi-field patch to one ticket.
///
/// Returns `Ok(true)` when the row was updated, `Ok(false)` when no ticket
/// with that id exists. Callers must not send success-implying
/// notifications on anything but `Ok(true)`.
pub async fn update_ticket(pool: &SqlitePool, id: &str, patch: &TicketPatch) -> Result<bool> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tickets SET updated_at = ");
    qb.push_bind(now_timestamp());

    if let Some(status) = patch.status {
        qb.push(", status = ").push_bind(status.as_str());
    }
    match patch.auto_status {
        Some(MarkerChange::Set(marker)) => {
            qb.push(", auto_status = ").push_bind(marker.as_str());
        }
        Some(MarkerChange::Clear) => {
            qb.push(", auto_status = NULL");
        }
        None => {}
    }
    if let Some(ref response) = patch.ai_response {
        qb.push(", ai_response = ").push_bind(response.clone());
    }
    if let Some(needed) = patch.admin_review_needed {
        qb.push(", admin_review_needed = ").push_bind(needed as i64);
    }
    if let Some(ref team) = patch.assigned_team {
        qb.push(", assigned_team = ").push_bind(team.clone());
    }
    if let Some(ref name) = patch.assigned_to {
        qb.push(", assigned_to = ").push_bind(name.clone());
    }
    if let Some(ref closed_at) = patch.closed_at {
        qb.push(", closed_at = ").push_bind(closed_at.clone());
    }

    qb.push(" WHERE id = ").push_bind(id.trim().to_string());

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Current open-ticket counts for everyone who has ever been assigned a
/// ticket. Placeholder names do not count as people. Ordered by open
/// count, then name, which is the documented balancer tie-break.
pub async fn workload_counts(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT assigned_to, SUM(CASE WHEN status = 'open' THEN 1 ELSE 0 END) AS open_count \
         FROM tickets \
         WHERE assigned_to IS NOT NULL \
           AND TRIM(LOWER(assigned_to)) NOT IN ('', 'nan', 'none', 'unknown', 'unassigned', 'default') \
         GROUP BY assigned_to \
         ORDER BY open_count ASC, assigned_to ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Open tickets with no real assignee (empty or placeholder names count as
/// unassigned, matching what intake systems tend to write).
pub async fn open_unassigned_tickets(pool: &SqlitePool) -> Result<Vec<Ticket>> {
    let rows = sqlx::query_as::<_, TicketRow>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets \
         WHERE status = 'open' \
           AND (assigned_to IS NULL \
                OR TRIM(LOWER(assigned_to)) IN ('', 'nan', 'none', 'unknown', 'unassigned', 'default')) \
         ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Ticket::try_from).collect()
}

/// Aggregate ticket counts for the read-only stats view.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TicketStats {
    pub total: i64,
    pub open: i64,
    pub pending_approval: i64,
    pub closed: i64,
    /// Closed automatically, still pending manager confirmation.
    pub review_queue: i64,
    /// Every ticket the automation has touched (either marker value).
    pub auto_processed: i64,
}

/// Compute aggregate ticket counts.
pub async fn ticket_stats(pool: &SqlitePool) -> Result<TicketStats> {
    let (total, open, pending_approval, closed, review_queue, auto_processed): (
        i64,
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        "SELECT COUNT(*), \
                COALESCE(SUM(CASE WHEN status = 'open' THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN status = 'pending_approval' THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN status = 'closed' THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN status = 'closed' AND auto_status = 'auto_resolved' THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN auto_status IS NOT NULL THEN 1 ELSE 0 END), 0) \
         FROM tickets",
    )
    .fetch_one(pool)
    .await?;

    Ok(TicketStats {
        total,
        open,
        pending_approval,
        closed,
        review_queue,
        auto_processed,
    })
}
