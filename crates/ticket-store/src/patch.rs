//! Multi-field ticket updates.

use std::str::FromStr;

use triage_core::{AutoStatus, TicketStatus};

use crate::error::StoreError;

/// Auto-resolution marker change carried by a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerChange {
    Set(AutoStatus),
    Clear,
}

/// A multi-field update applied to one ticket in one statement.
///
/// Unset fields are left untouched. `updated_at` is always stamped.
#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    pub status: Option<TicketStatus>,
    pub auto_status: Option<MarkerChange>,
    pub ai_response: Option<String>,
    pub admin_review_needed: Option<bool>,
    pub assigned_team: Option<String>,
    pub assigned_to: Option<String>,
    pub closed_at: Option<String>,
}

impl TicketPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn auto_status(mut self, marker: AutoStatus) -> Self {
        self.auto_status = Some(MarkerChange::Set(marker));
        self
    }

    pub fn clear_auto_status(mut self) -> Self {
        self.auto_status = Some(MarkerChange::Clear);
        self
    }

    pub fn ai_response(mut self, response: impl Into<String>) -> Self {
        self.ai_response = Some(response.into());
        self
    }

    pub fn admin_review_needed(mut self, needed: bool) -> Self {
        self.admin_review_needed = Some(needed);
        self
    }

    pub fn assigned_team(mut self, team: impl Into<String>) -> Self {
        self.assigned_team = Some(team.into());
        self
    }

    pub fn assigned_to(mut self, name: impl Into<String>) -> Self {
        self.assigned_to = Some(name.into());
        self
    }

    pub fn closed_at(mut self, timestamp: impl Into<String>) -> Self {
        self.closed_at = Some(timestamp.into());
        self
    }

    /// Whether the patch carries any change.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.auto_status.is_none()
            && self.ai_response.is_none()
            && self.admin_review_needed.is_none()
            && self.assigned_team.is_none()
            && self.assigned_to.is_none()
            && self.closed_at.is_none()
    }

    /// Apply a string-keyed field update, tolerating the field-name aliases
    /// older callers use ("Team Name" for the assigned team, "Person Name"
    /// for the assigned person, and so on).
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), StoreError> {
        match canonical_field(field) {
            Some(CanonicalField::Status) => {
                let status = TicketStatus::from_str(value).map_err(|_| {
                    StoreError::InvalidValue {
                        field: "status",
                        value: value.to_string(),
                    }
                })?;
                self.status = Some(status);
            }
            Some(CanonicalField::AutoStatus) => {
                let trimmed = value.trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("false") {
                    self.auto_status = Some(MarkerChange::Clear);
                } else {
                    let marker = AutoStatus::from_str(trimmed).map_err(|_| {
                        StoreError::InvalidValue {
                            field: "auto_status",
                            value: value.to_string(),
                        }
                    })?;
                    self.auto_status = Some(MarkerChange::Set(marker));
                }
            }
            Some(CanonicalField::AiResponse) => self.ai_response = Some(value.to_string()),
            Some(CanonicalField::AdminReviewNeeded) => {
                self.admin_review_needed = Some(parse_flag(value));
            }
            Some(CanonicalField::AssignedTeam) => self.assigned_team = Some(value.to_string()),
            Some(CanonicalField::AssignedTo) => self.assigned_to = Some(value.to_string()),
            Some(CanonicalField::ClosedAt) => self.closed_at = Some(value.to_string()),
            None => return Err(StoreError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

enum CanonicalField {
    Status,
    AutoStatus,
    AiResponse,
    AdminReviewNeeded,
    AssignedTeam,
    AssignedTo,
    ClosedAt,
}

fn canonical_field(field: &str) -> Option<CanonicalField> {
    let key = field.trim().to_lowercase();
    match key.as_str() {
        "status" | "ticket status" | "ticket_status" => Some(CanonicalField::Status),
        "auto_status" | "auto solved" | "auto_solved" => Some(CanonicalField::AutoStatus),
        "ai_response" | "ai response" => Some(CanonicalField::AiResponse),
        "admin_review_needed" | "admin review needed" => Some(CanonicalField::AdminReviewNeeded),
        "assigned_team" | "assigned team" | "team name" | "team_name" => {
            Some(CanonicalField::AssignedTeam)
        }
        "assigned_to" | "assigned to" | "person name" | "person_name" | "user name"
        | "user_name" => Some(CanonicalField::AssignedTo),
        "closed_at" | "ticket closed date" | "ticket_closed_date" => Some(CanonicalField::ClosedAt),
        _ => None,
    }
}

/// Yes/No style flags from older callers.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "true" | "1" | "y"
    )
}
