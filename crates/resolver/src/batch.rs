//! Batch pass over eligible tickets.

use std::sync::Arc;

use tracing::{error, info};

use ticket_store::ticket;

use crate::engine::ResolutionEngine;
use crate::outcome::Resolution;

/// Selects eligible tickets and resolves them sequentially.
///
/// Eligibility is the at-most-one-automated-attempt invariant: not closed
/// and never touched by the automation. The set is selected once; failures
/// are contained per ticket and never retried within the same run. The
/// underlying store has no row-level locking, so there is deliberately no
/// concurrent fan-out here.
pub struct BatchRunner {
    engine: Arc<ResolutionEngine>,
}

impl BatchRunner {
    pub fn new(engine: Arc<ResolutionEngine>) -> Self {
        Self { engine }
    }

    /// Run one batch pass and collect per-ticket outcome strings.
    ///
    /// Designed to be spawned as a detached background task: the caller
    /// must not assume completion before returning, and progress is
    /// observed by re-reading the store.
    pub async fn run(&self) -> Vec<String> {
        let tickets = match ticket::eligible_tickets(self.engine.store().pool()).await {
            Ok(tickets) => tickets,
            Err(err) => {
                error!(error = %err, "Failed to select eligible tickets");
                return vec![format!("batch selection failed: {}", err)];
            }
        };

        info!(count = tickets.len(), "Starting batch resolution pass");

        let mut results = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let outcome = self.engine.resolve(&ticket).await;
            info!(ticket = %ticket.id, outcome = %outcome, "Ticket processed");
            results.push(outcome.to_string());
        }

        info!(count = results.len(), "Batch resolution pass complete");
        results
    }

    /// Resolve a single ticket by id (manual trigger path).
    pub async fn run_one(&self, ticket_id: &str) -> Resolution {
        match ticket::get_ticket(self.engine.store().pool(), ticket_id).await {
            Ok(ticket) => self.engine.resolve(&ticket).await,
            Err(err) => Resolution::Failed {
                ticket_id: ticket_id.to_string(),
                reason: err.to_string(),
            },
        }
    }
}
