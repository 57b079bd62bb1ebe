//! Shared fixtures for handler tests.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use tokio::sync::Mutex;

use mock_chat::ScriptedChat;
use resolver::{BatchRunner, EngineConfig, ResolutionEngine};
use ticket_store::{roster, Store};
use triage_core::{
    async_trait, DocumentKind, DocumentRenderer, Invoice, Notification, Notifier, NotifyError,
    Role, RosterEntry,
};

use crate::auth::Session;
use crate::state::AppState;

/// Records notifications instead of sending them.
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().await.push(note.clone());
        Ok(())
    }
}

struct NoneRenderer;

impl DocumentRenderer for NoneRenderer {
    fn render(&self, _: DocumentKind, _: &Invoice, _: &str) -> Option<std::path::PathBuf> {
        None
    }
}

/// An in-memory state with a seeded roster and a recording notifier.
pub async fn state_with_recorder() -> (AppState, Arc<RecordingNotifier>) {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();

    for (email, name, role, teams) in [
        ("alice@example.com", "Alice Green", Role::Employee, None),
        ("robert@example.com", "Robert Brown", Role::Employee, Some("AP")),
        ("maya@example.com", "Maya Lopez", Role::Manager, Some("AP, AR")),
        ("root@example.com", "Sys Admin", Role::Admin, None),
    ] {
        roster::add_entry(
            store.pool(),
            &RosterEntry {
                email: email.to_string(),
                password: "123".to_string(),
                name: name.to_string(),
                role,
                teams: teams.map(str::to_string),
            },
        )
        .await
        .unwrap();
    }

    let notifier = RecordingNotifier::new();
    let engine = ResolutionEngine::new(
        Arc::new(ScriptedChat::new(vec![])),
        store.clone(),
        Arc::new(store.clone()),
        notifier.clone(),
        Arc::new(NoneRenderer),
        EngineConfig {
            approval_secret: "test_secret".to_string(),
            base_url: "http://localhost:8080".to_string(),
            max_turns: 6,
        },
    );
    let runner = Arc::new(BatchRunner::new(Arc::new(engine)));

    let state = AppState::new(
        store,
        runner,
        notifier.clone(),
        "test_secret".to_string(),
    );
    (state, notifier)
}

/// Headers carrying a fresh manager session.
pub fn supervisor_headers(state: &AppState) -> HeaderMap {
    let token = state.sessions.create(Session {
        email: "maya@example.com".to_string(),
        name: "Maya Lopez".to_string(),
        role: Role::Manager,
    });
    bearer_headers(&token)
}

/// Headers carrying a fresh admin session.
pub fn admin_headers(state: &AppState) -> HeaderMap {
    let token = state.sessions.create(Session {
        email: "root@example.com".to_string(),
        name: "Sys Admin".to_string(),
        role: Role::Admin,
    });
    bearer_headers(&token)
}

/// Wrap a session token in an Authorization header.
pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
    headers
}
