//! Application state shared across handlers.

use std::sync::Arc;

use resolver::BatchRunner;
use ticket_store::Store;
use triage_core::Notifier;

use crate::auth::Sessions;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Ticket/invoice/roster store.
    pub store: Store,
    /// Batch runner over the resolution engine.
    pub runner: Arc<BatchRunner>,
    /// Notifier for gateway-originated emails (approval outcomes).
    pub notifier: Arc<dyn Notifier>,
    /// Active login sessions.
    pub sessions: Arc<Sessions>,
    /// Shared secret for approve/reject tokens.
    pub approval_secret: String,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        store: Store,
        runner: Arc<BatchRunner>,
        notifier: Arc<dyn Notifier>,
        approval_secret: String,
    ) -> Self {
        Self {
            store,
            runner,
            notifier,
            sessions: Arc::new(Sessions::new()),
            approval_secret,
        }
    }
}
