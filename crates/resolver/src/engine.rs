//! The resolution engine: one bounded tool-calling conversation per ticket,
//! then the chosen outcome's effects against the store and notifier.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use ticket_store::{invoice, ticket, now_timestamp, Store, TicketPatch};
use triage_core::{
    invoice_ref, token, AutoStatus, ChatMessage, ClosureType, Directory, DocumentKind,
    DocumentRenderer, Invoice, Notification, Notifier, SpecialistTeam, Ticket, TicketStatus,
    ToolArgs, ToolCall, ToolChat,
};

use crate::outcome::Resolution;
use crate::prompts::{ticket_context, SYSTEM_PROMPT};
use crate::schema::tool_definitions;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shared secret for approval tokens.
    pub approval_secret: String,
    /// Base URL used to build approve/reject links.
    pub base_url: String,
    /// Hard upper bound on conversation turns per ticket.
    pub max_turns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            approval_secret: "querydesk_approval_secret".to_string(),
            base_url: "http://localhost:8080".to_string(),
            max_turns: 6,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// - `APPROVAL_SECRET` - shared secret for approve/reject tokens
    /// - `APP_BASE_URL` - base URL for links (default: http://localhost:8080)
    /// - `RESOLVER_MAX_TURNS` - conversation turn bound (default: 6)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            approval_secret: std::env::var("APPROVAL_SECRET")
                .unwrap_or(defaults.approval_secret),
            base_url: std::env::var("APP_BASE_URL").unwrap_or(defaults.base_url),
            max_turns: std::env::var("RESOLVER_MAX_TURNS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_turns),
        }
    }
}

/// Drives ticket resolution.
///
/// The engine never propagates collaborator failures past its boundary:
/// model, store and notification errors are logged and contained in the
/// returned [`Resolution`] so one bad ticket cannot abort a batch.
pub struct ResolutionEngine {
    chat: Arc<dyn ToolChat>,
    store: Store,
    directory: Arc<dyn Directory>,
    notifier: Arc<dyn Notifier>,
    renderer: Arc<dyn DocumentRenderer>,
    config: EngineConfig,
}

/// What a dispatched tool call did to the conversation.
enum Dispatch {
    /// Pure transcript extension; the loop continues.
    Continue(ChatMessage),
    /// A terminal tool ran its effects; the loop is over.
    Terminal(Resolution),
}

impl ResolutionEngine {
    pub fn new(
        chat: Arc<dyn ToolChat>,
        store: Store,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn DocumentRenderer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            chat,
            store,
            directory,
            notifier,
            renderer,
            config,
        }
    }

    /// The underlying store (used by the batch runner and gateway).
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve one ticket end-to-end.
    ///
    /// Precondition: the ticket is not closed; a closed ticket is skipped
    /// with no side effects. Performs at most one terminal transition.
    pub async fn resolve(&self, ticket: &Ticket) -> Resolution {
        if ticket.status == TicketStatus::Closed {
            info!(ticket = %ticket.id, "Skipping: already closed");
            return Resolution::Skipped {
                ticket_id: ticket.id.clone(),
            };
        }

        info!(ticket = %ticket.id, "Processing ticket");
        debug!(description = %ticket.description, "Ticket context");

        let tools = tool_definitions();
        let mut transcript = vec![ChatMessage::system(SYSTEM_PROMPT), ticket_context(ticket)];
        // Rows surfaced by the most recent search, preferred for documents.
        let mut last_search: Vec<Invoice> = Vec::new();

        for turn in 0..self.config.max_turns {
            let reply = match self.chat.complete(&transcript, &tools).await {
                Ok(reply) => reply,
                Err(err) => {
                    warn!(ticket = %ticket.id, turn, error = %err, "Model call failed");
                    return Resolution::Failed {
                        ticket_id: ticket.id.clone(),
                        reason: format!("model call failed: {}", err),
                    };
                }
            };

            if !reply.has_tool_calls() {
                let reply = reply
                    .content
                    .unwrap_or_else(|| "No resolution reached.".to_string());
                info!(ticket = %ticket.id, "Model finished without a terminal tool call");
                return Resolution::ModelReply {
                    ticket_id: ticket.id.clone(),
                    reply,
                };
            }

            transcript.push(reply.to_message());

            for call in &reply.tool_calls {
                match self.dispatch(ticket, call, &mut last_search).await {
                    Dispatch::Continue(message) => transcript.push(message),
                    Dispatch::Terminal(resolution) => return resolution,
                }
            }
        }

        info!(ticket = %ticket.id, "Turn limit exhausted");
        Resolution::Unresolved {
            ticket_id: ticket.id.clone(),
        }
    }

    /// Dispatch one tool call. Tool calls within a turn run sequentially;
    /// argument problems are reported back to the model as tool results.
    async fn dispatch(
        &self,
        ticket: &Ticket,
        call: &ToolCall,
        last_search: &mut Vec<Invoice>,
    ) -> Dispatch {
        let name = call.function.name.as_str();

        match name {
            "search_invoices" => {
                let filter: ticket_store::InvoiceFilter =
                    serde_json::from_str(&call.function.arguments).unwrap_or_default();
                if filter.is_empty() {
                    debug!(ticket = %ticket.id, "Unconstrained invoice search");
                }
                info!(ticket = %ticket.id, ?filter, "Searching invoices");
                match invoice::search_invoices(self.store.pool(), &filter).await {
                    Ok(rows) => {
                        info!(ticket = %ticket.id, matches = rows.len(), "Search complete");
                        let payload =
                            serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string());
                        *last_search = rows;
                        Dispatch::Continue(ChatMessage::tool(&call.id, name, payload))
                    }
                    Err(err) => {
                        warn!(ticket = %ticket.id, error = %err, "Invoice search failed");
                        Dispatch::Continue(ChatMessage::tool(
                            &call.id,
                            name,
                            format!("Error: search failed: {}", err),
                        ))
                    }
                }
            }

            "resolve_ticket" => {
                let args = match ToolArgs::from_json(&call.function.arguments) {
                    Ok(args) => args,
                    Err(err) => {
                        return Dispatch::Continue(ChatMessage::tool(
                            &call.id,
                            name,
                            format!("Error: invalid arguments: {}", err),
                        ))
                    }
                };

                let closure = match args
                    .require_string("closure_type")
                    .and_then(|raw| raw.parse::<ClosureType>().map_err(|e| e.to_string()))
                {
                    Ok(closure) => closure,
                    Err(err) => {
                        // An unknown closure type is a dispatch error fed back
                        // to the model, never a silent without_document.
                        return Dispatch::Continue(ChatMessage::tool(
                            &call.id,
                            name,
                            format!("Error: {}", err),
                        ));
                    }
                };

                let kind = match args.get_string("document_kind") {
                    None => DocumentKind::InvoiceCopy,
                    Some(raw) => match raw.parse::<DocumentKind>() {
                        Ok(kind) => kind,
                        Err(err) => {
                            return Dispatch::Continue(ChatMessage::tool(
                                &call.id,
                                name,
                                format!("Error: {}", err),
                            ))
                        }
                    },
                };

                if let Some(claimed) = args.get_string("ticket_id") {
                    if claimed != ticket.id {
                        warn!(ticket = %ticket.id, claimed, "Model referenced a different ticket id");
                    }
                }

                let ai_response = args
                    .get_string("ai_response")
                    .unwrap_or("Ticket processed by the query management agent.")
                    .to_string();
                // Advisory only: closure_type alone drives the transition.
                let auto_solved = args.get_bool_or("auto_solved", true);
                info!(
                    ticket = %ticket.id,
                    closure = closure.as_str(),
                    auto_solved,
                    "resolve_ticket called"
                );

                let resolution = match closure {
                    ClosureType::NeedsApproval => {
                        self.route_for_approval(ticket, &ai_response).await
                    }
                    ClosureType::WithoutDocument | ClosureType::WithDocument => {
                        self.close_ticket(ticket, closure, kind, &ai_response, last_search)
                            .await
                    }
                };
                Dispatch::Terminal(resolution)
            }

            "reassign_ticket" => {
                let args = match ToolArgs::from_json(&call.function.arguments) {
                    Ok(args) => args,
                    Err(err) => {
                        return Dispatch::Continue(ChatMessage::tool(
                            &call.id,
                            name,
                            format!("Error: invalid arguments: {}", err),
                        ))
                    }
                };

                let team = match args
                    .require_string("team")
                    .and_then(|raw| raw.parse::<SpecialistTeam>().map_err(|e| e.to_string()))
                {
                    Ok(team) => team,
                    Err(err) => {
                        return Dispatch::Continue(ChatMessage::tool(
                            &call.id,
                            name,
                            format!("Error: {}", err),
                        ))
                    }
                };
                let reason = args
                    .get_string("reason")
                    .unwrap_or("Requires specialist handling.")
                    .to_string();

                info!(ticket = %ticket.id, team = team.as_str(), "reassign_ticket called");
                Dispatch::Terminal(self.reassign(ticket, team, &reason).await)
            }

            other => {
                warn!(ticket = %ticket.id, tool = other, "Unknown tool requested");
                Dispatch::Continue(ChatMessage::tool(
                    &call.id,
                    other,
                    format!("Error: Unknown tool: {}", other),
                ))
            }
        }
    }

    /// Close a ticket directly, optionally with an attached document.
    ///
    /// The store transition happens first; a notification failure is logged
    /// and never rolls it back.
    async fn close_ticket(
        &self,
        ticket: &Ticket,
        closure: ClosureType,
        kind: DocumentKind,
        ai_response: &str,
        last_search: &[Invoice],
    ) -> Resolution {
        let patch = TicketPatch::new()
            .status(TicketStatus::Closed)
            .auto_status(AutoStatus::AutoResolved)
            .ai_response(ai_response)
            .closed_at(now_timestamp());

        if !self.apply_patch(&ticket.id, &patch).await {
            return Resolution::Failed {
                ticket_id: ticket.id.clone(),
                reason: "store update failed".to_string(),
            };
        }

        let Some(recipient) = self.requester_email(ticket).await else {
            info!(ticket = %ticket.id, "No requester email resolvable; closed without notification");
            return Resolution::Resolved {
                ticket_id: ticket.id.clone(),
                closure,
                detail: format!("{} (requester address unknown, no notification)", ai_response),
            };
        };

        let mut extra = String::new();
        let mut attachment: Option<PathBuf> = None;

        if closure == ClosureType::WithDocument {
            match self.locate_invoice(ticket, last_search).await {
                Some(record) => match self.renderer.render(kind, &record, &ticket.description) {
                    Some(path) => attachment = Some(path),
                    None => {
                        extra = format!(
                            "\n\nDocument generation was unavailable. Ledger status for {}: {}.",
                            record.invoice_number,
                            record.payment_status.as_deref().unwrap_or("Unknown")
                        );
                    }
                },
                None => {
                    extra = "\n\nNo matching invoice record could be located, so no document is attached."
                        .to_string();
                }
            }
        }

        let body = resolution_body(ticket, ai_response, &extra);
        let mut note = Notification::new(recipient, format!("Ticket {} Resolved", ticket.id), body);
        if let Some(ref path) = attachment {
            note = note.with_attachment(path.clone());
        }

        if let Err(err) = self.notifier.send(&note).await {
            warn!(ticket = %ticket.id, error = %err, "Resolution notification failed");
        }

        // Rendered documents are temporary regardless of send outcome.
        if let Some(path) = attachment {
            if let Err(err) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), error = %err, "Failed to remove temporary document");
            }
        }

        Resolution::Resolved {
            ticket_id: ticket.id.clone(),
            closure,
            detail: ai_response.to_string(),
        }
    }

    /// Route a ticket to its team's manager for sign-off.
    ///
    /// A missing manager is a silent gap in the roster, not an error: the
    /// ticket stays pending with no notification.
    async fn route_for_approval(&self, ticket: &Ticket, ai_response: &str) -> Resolution {
        let patch = TicketPatch::new()
            .status(TicketStatus::PendingApproval)
            .auto_status(AutoStatus::AutoResolved)
            .admin_review_needed(true)
            .ai_response(ai_response);

        if !self.apply_patch(&ticket.id, &patch).await {
            return Resolution::Failed {
                ticket_id: ticket.id.clone(),
                reason: "store update failed".to_string(),
            };
        }

        let team = ticket.assigned_team.as_deref().unwrap_or_default();
        let Some(manager) = self.directory.manager_for_team(team).await else {
            info!(ticket = %ticket.id, team, "No manager on file; pending without notification");
            return Resolution::Resolved {
                ticket_id: ticket.id.clone(),
                closure: ClosureType::NeedsApproval,
                detail: format!("{} (no manager found for team {})", ai_response, team),
            };
        };

        let minted = token::mint(&ticket.id, &self.config.approval_secret);
        let base = self.config.base_url.trim_end_matches('/');
        let approve_link = format!("{}/ticket/approve/{}?token={}", base, ticket.id, minted);
        let reject_link = format!("{}/ticket/reject/{}?token={}", base, ticket.id, minted);

        let body = format!(
            "Hello {},\n\n\
             The agent has resolved Ticket {} and needs your sign-off.\n\n\
             Team: {}\n\n\
             Agent resolution:\n{}\n\n\
             Please review:\n\
             -> APPROVE: {}\n\
             -> REJECT & REOPEN: {}\n\n\
             Regards,\nQuerydesk Query Management System",
            manager.name, ticket.id, team, ai_response, approve_link, reject_link
        );

        let note = Notification::new(
            manager.email,
            format!("Approval Required: Ticket {}", ticket.id),
            body,
        );
        if let Err(err) = self.notifier.send(&note).await {
            warn!(ticket = %ticket.id, error = %err, "Approval notification failed");
        }

        Resolution::Resolved {
            ticket_id: ticket.id.clone(),
            closure: ClosureType::NeedsApproval,
            detail: ai_response.to_string(),
        }
    }

    /// Hand a ticket to a specialist queue: back to open, marker cleared,
    /// both the requester and the previous assignee are told.
    async fn reassign(&self, ticket: &Ticket, team: SpecialistTeam, reason: &str) -> Resolution {
        let patch = TicketPatch::new()
            .status(TicketStatus::Open)
            .clear_auto_status()
            .assigned_team(team.as_str())
            .ai_response(reason);

        if !self.apply_patch(&ticket.id, &patch).await {
            return Resolution::Failed {
                ticket_id: ticket.id.clone(),
                reason: "store update failed".to_string(),
            };
        }

        if let Some(recipient) = self.requester_email(ticket).await {
            let body = format!(
                "Hello {},\n\n\
                 Your ticket {} has been routed to the {} specialist team for direct handling.\n\n\
                 Reason: {}\n\n\
                 Regards,\nQuerydesk Query Management System",
                ticket.requester_name.as_deref().unwrap_or("there"),
                ticket.id,
                team.as_str(),
                reason
            );
            let note =
                Notification::new(recipient, format!("Update on Ticket {}", ticket.id), body);
            if let Err(err) = self.notifier.send(&note).await {
                warn!(ticket = %ticket.id, error = %err, "Requester reassignment notification failed");
            }
        } else {
            info!(ticket = %ticket.id, "No requester email for reassignment notice");
        }

        if let Some(previous) = ticket.assigned_to.as_deref() {
            if let Some(email) = self.directory.email_for_name(previous).await {
                let body = format!(
                    "Hello {},\n\n\
                     Ticket {} has been handed off to the {} queue and no longer needs your attention.\n\n\
                     Description: {}\n\
                     Reason: {}\n\n\
                     Regards,\nQuerydesk Query Management System",
                    previous, ticket.id, team.as_str(), ticket.description, reason
                );
                let note =
                    Notification::new(email, format!("Ticket {} handed off", ticket.id), body);
                if let Err(err) = self.notifier.send(&note).await {
                    warn!(ticket = %ticket.id, error = %err, "Handoff notification failed");
                }
            }
        }

        Resolution::Reassigned {
            ticket_id: ticket.id.clone(),
            team,
        }
    }

    /// Apply a patch, folding store errors into a boolean the callers turn
    /// into a `Failed` outcome.
    async fn apply_patch(&self, ticket_id: &str, patch: &TicketPatch) -> bool {
        match ticket::update_ticket(self.store.pool(), ticket_id, patch).await {
            Ok(updated) => {
                if !updated {
                    warn!(ticket = %ticket_id, "Store update matched no ticket");
                }
                updated
            }
            Err(err) => {
                warn!(ticket = %ticket_id, error = %err, "Store update failed");
                false
            }
        }
    }

    /// Best-effort requester address: explicit field, then requester name,
    /// then the assigned person as a last resort.
    async fn requester_email(&self, ticket: &Ticket) -> Option<String> {
        if let Some(email) = ticket.requester_email.as_deref() {
            let email = email.trim();
            if !email.is_empty() {
                return Some(email.to_string());
            }
        }
        if let Some(name) = ticket.requester_name.as_deref() {
            if let Some(email) = self.directory.email_for_name(name).await {
                return Some(email);
            }
        }
        if let Some(name) = ticket.assigned_to.as_deref() {
            if let Some(email) = self.directory.email_for_name(name).await {
                return Some(email);
            }
        }
        None
    }

    /// Find the invoice to document: prefer rows surfaced by a prior search
    /// in this conversation, then try extracted references one by one.
    async fn locate_invoice(&self, ticket: &Ticket, last_search: &[Invoice]) -> Option<Invoice> {
        if let Some(first) = last_search.first() {
            return Some(first.clone());
        }

        for candidate in invoice_ref::extract_candidates(&ticket.description) {
            match invoice::invoice_by_number(self.store.pool(), &candidate).await {
                Ok(Some(record)) => return Some(record),
                Ok(None) => continue,
                Err(err) => {
                    warn!(ticket = %ticket.id, candidate, error = %err, "Invoice lookup failed");
                }
            }
        }
        None
    }
}

/// Body of a requester-facing resolution email.
fn resolution_body(ticket: &Ticket, ai_response: &str, extra: &str) -> String {
    let greeting = ticket
        .requester_name
        .as_deref()
        .or(ticket.assigned_to.as_deref())
        .unwrap_or("there");
    format!(
        "Hello {},\n\n{}{}\n\nTicket ID: {}\nStatus: Closed\n\n\
         Regards,\nQuerydesk Query Management System",
        greeting, ai_response, extra, ticket.id
    )
}
