//! Domain model shared across the triage system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failed to parse an enum value from its stored/wire form.
#[derive(Debug, Error)]
#[error("unrecognized {kind}: {value}")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl ParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    PendingApproval,
    Closed,
}

impl TicketStatus {
    /// Stored form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::PendingApproval => "pending_approval",
            TicketStatus::Closed => "closed",
        }
    }

    /// Human-readable label used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::PendingApproval => "Pending Manager Approval",
            TicketStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "pending_approval" | "pending manager approval" => Ok(TicketStatus::PendingApproval),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(ParseError::new("ticket status", other)),
        }
    }
}

/// How a ticket reached its current closed/pending state.
///
/// Absent means the ticket was never processed automatically (or the marker
/// was cleared by a manager review). Together with [`TicketStatus`] this
/// defines the review queue: closed tickets still marked `AutoResolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoStatus {
    /// Closed or routed automatically, pending manager confirmation.
    AutoResolved,
    /// A manager acted on the ticket (approve, reject, confirm, reopen).
    ManagerReviewed,
}

impl AutoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoStatus::AutoResolved => "auto_resolved",
            AutoStatus::ManagerReviewed => "manager_reviewed",
        }
    }
}

impl FromStr for AutoStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto_resolved" => Ok(AutoStatus::AutoResolved),
            "manager_reviewed" => Ok(AutoStatus::ManagerReviewed),
            other => Err(ParseError::new("auto status", other)),
        }
    }
}

/// Roster role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Whether this role may trigger batch processing and review tickets.
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(ParseError::new("role", other)),
        }
    }
}

/// Terminal closure chosen by the model for a direct resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureType {
    /// Answer the requester and close; no attachment.
    WithoutDocument,
    /// Render a summary document, attach it, and close.
    WithDocument,
    /// Route to the team's manager for sign-off.
    NeedsApproval,
}

impl ClosureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosureType::WithoutDocument => "without_document",
            ClosureType::WithDocument => "with_document",
            ClosureType::NeedsApproval => "needs_approval",
        }
    }
}

impl FromStr for ClosureType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "without_document" => Ok(ClosureType::WithoutDocument),
            "with_document" => Ok(ClosureType::WithDocument),
            "needs_approval" => Ok(ClosureType::NeedsApproval),
            other => Err(ParseError::new("closure type", other)),
        }
    }
}

/// The kind of summary document the model asked to attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    InvoiceCopy,
    PaymentConfirmation,
    InvoiceDetails,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::InvoiceCopy => "invoice_copy",
            DocumentKind::PaymentConfirmation => "payment_confirmation",
            DocumentKind::InvoiceDetails => "invoice_details",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice_copy" => Ok(DocumentKind::InvoiceCopy),
            "payment_confirmation" => Ok(DocumentKind::PaymentConfirmation),
            "invoice_details" => Ok(DocumentKind::InvoiceDetails),
            other => Err(ParseError::new("document kind", other)),
        }
    }
}

/// Specialist queue a ticket can be reassigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialistTeam {
    #[serde(rename = "AP", alias = "ap")]
    Ap,
    #[serde(rename = "AR", alias = "ar")]
    Ar,
}

impl SpecialistTeam {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialistTeam::Ap => "AP",
            SpecialistTeam::Ar => "AR",
        }
    }
}

impl FromStr for SpecialistTeam {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ap" => Ok(SpecialistTeam::Ap),
            "ar" => Ok(SpecialistTeam::Ar),
            other => Err(ParseError::new("specialist team", other)),
        }
    }
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket identifier (e.g. "T100").
    pub id: String,
    /// Free-text problem description.
    pub description: String,
    pub status: TicketStatus,
    /// Ticket classification (e.g. "Accounts Payable").
    pub ticket_type: Option<String>,
    /// Assigned team label (e.g. "AP", "AR").
    pub assigned_team: Option<String>,
    /// Assigned person's display name.
    pub assigned_to: Option<String>,
    /// Name of the person who raised the ticket.
    pub requester_name: Option<String>,
    /// Explicit requester email, if the intake form captured one.
    pub requester_email: Option<String>,
    /// Auto-resolution marker; `None` means never processed / cleared.
    pub auto_status: Option<AutoStatus>,
    /// The model's explanation of its resolution.
    pub ai_response: Option<String>,
    /// Flagged for manager attention.
    pub admin_review_needed: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub closed_at: Option<String>,
}

/// An invoice ledger row. Read-only from the engine's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Canonical invoice number (`INV-<digits>`).
    pub invoice_number: String,
    pub invoice_date: Option<String>,
    pub amount: Option<f64>,
    pub vendor_id: Option<String>,
    pub vendor_name: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub po_number: Option<String>,
    pub po_status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_term: Option<String>,
    pub due_date: Option<String>,
    pub clearing_date: Option<String>,
    pub country: Option<String>,
}

impl Invoice {
    /// Vendor or customer, whichever the ledger row carries.
    pub fn counterpart(&self) -> Option<&str> {
        self.vendor_name
            .as_deref()
            .or(self.customer_name.as_deref())
    }
}

/// A roster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Unique login email.
    pub email: String,
    /// Demo-grade opaque password.
    pub password: String,
    /// Display name.
    pub name: String,
    pub role: Role,
    /// Comma-separated team affiliations; meaningful for manager/admin.
    pub teams: Option<String>,
}

impl RosterEntry {
    /// Team affiliations as trimmed, non-empty segments.
    pub fn team_list(&self) -> Vec<&str> {
        self.teams
            .as_deref()
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
