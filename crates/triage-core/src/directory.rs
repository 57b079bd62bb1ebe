//! Directory lookup trait seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A resolved person: display name and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

/// Trait for resolving people against the roster.
///
/// Lookups return `None` for misses; directory errors are an implementation
/// concern and never cross this boundary.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve a person's email by display name (case-insensitive).
    async fn email_for_name(&self, name: &str) -> Option<String>;

    /// Resolve the manager responsible for a team label.
    async fn manager_for_team(&self, team: &str) -> Option<Contact>;
}
