//! Resolution outcomes.

use std::fmt;

use triage_core::{ClosureType, SpecialistTeam};

/// The result of one `resolve` call.
///
/// Exactly one variant is produced per call; terminal store transitions
/// only happen for `Resolved` and `Reassigned`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Precondition failed: the ticket was already closed. No side effects.
    Skipped { ticket_id: String },
    /// The model chose a closure and its effects were applied.
    Resolved {
        ticket_id: String,
        closure: ClosureType,
        detail: String,
    },
    /// The ticket was routed back to a specialist queue.
    Reassigned {
        ticket_id: String,
        team: SpecialistTeam,
    },
    /// The model answered with free text and committed to nothing.
    /// The ticket is unchanged.
    ModelReply { ticket_id: String, reply: String },
    /// The turn limit was reached without a terminal tool call.
    /// The ticket is unchanged and eligible for manual follow-up.
    Unresolved { ticket_id: String },
    /// A collaborator failure was contained; the ticket may be partially
    /// processed (store update applied, notification skipped) or untouched.
    Failed { ticket_id: String, reason: String },
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Skipped { ticket_id } => {
                write!(f, "Ticket {} is already closed.", ticket_id)
            }
            Resolution::Resolved {
                ticket_id,
                closure,
                detail,
            } => write!(f, "Ticket {} processed: {} | {}", ticket_id, closure.as_str(), detail),
            Resolution::Reassigned { ticket_id, team } => {
                write!(f, "Ticket {} reassigned to the {} queue.", ticket_id, team.as_str())
            }
            Resolution::ModelReply { ticket_id, reply } => {
                write!(f, "Ticket {} left open, agent note: {}", ticket_id, reply)
            }
            Resolution::Unresolved { ticket_id } => write!(
                f,
                "Ticket {} unresolved: agent reached maximum turns without a decision.",
                ticket_id
            ),
            Resolution::Failed { ticket_id, reason } => {
                write!(f, "Ticket {} processing failed: {}", ticket_id, reason)
            }
        }
    }
}

impl Resolution {
    /// Whether this outcome performed a terminal store transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Resolution::Resolved { .. } | Resolution::Reassigned { .. })
    }
}
