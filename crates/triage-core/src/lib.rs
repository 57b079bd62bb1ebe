//! Core traits and types for the Querydesk triage system.
//!
//! This crate provides the shared interface between the resolution engine
//! and its collaborators. It defines:
//!
//! - [`ToolChat`] - The trait a tool-calling language model client implements
//! - [`ChatMessage`] / [`ToolCall`] / [`ToolDefinition`] - Conversation types
//! - [`Notifier`] / [`DocumentRenderer`] / [`Directory`] - Collaborator seams
//! - The domain model ([`Ticket`], [`Invoice`], [`RosterEntry`] and enums)
//! - [`token`] - Approval token codec for approve/reject links
//! - [`invoice_ref`] - Invoice-number extraction from free text

mod chat;
mod directory;
mod error;
pub mod invoice_ref;
mod model;
mod notify;
mod render;
pub mod token;
mod tools;

pub use chat::{AssistantTurn, ChatMessage, FunctionCall, FunctionSpec, ToolCall, ToolChat, ToolDefinition};
pub use directory::{Contact, Directory};
pub use error::ChatError;
pub use model::{
    AutoStatus, ClosureType, DocumentKind, Invoice, ParseError, Role, RosterEntry, SpecialistTeam,
    Ticket, TicketStatus,
};
pub use notify::{Notification, Notifier, NotifyError};
pub use render::{DocumentRenderer, RenderError};
pub use tools::ToolArgs;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
