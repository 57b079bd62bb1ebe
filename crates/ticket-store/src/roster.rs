//! Roster CRUD and directory lookups.
//!
//! The roster is owned by the administrative surface; during resolution it
//! is a read-only directory behind the [`Directory`] trait.

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

use triage_core::{Contact, Directory, Role, RosterEntry};

use crate::error::{Result, StoreError};
use crate::Store;

#[derive(Debug, FromRow)]
struct RosterRow {
    email: String,
    password: String,
    name: String,
    role: String,
    teams: Option<String>,
}

impl TryFrom<RosterRow> for RosterEntry {
    type Error = StoreError;

    fn try_from(row: RosterRow) -> Result<RosterEntry> {
        Ok(RosterEntry {
            email: row.email,
            password: row.password,
            name: row.name,
            role: Role::from_str(&row.role)?,
            teams: row.teams,
        })
    }
}

/// Add a roster member. Duplicate emails are rejected.
pub async fn add_entry(pool: &SqlitePool, entry: &RosterEntry) -> Result<()> {
    sqlx::query("INSERT INTO roster (email, password, name, role, teams) VALUES (?, ?, ?, ?, ?)")
        .bind(&entry.email)
        .bind(&entry.password)
        .bind(&entry.name)
        .bind(entry.role.as_str())
        .bind(&entry.teams)
        .execute(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return StoreError::AlreadyExists {
                        entity: "RosterEntry",
                        id: entry.email.clone(),
                    };
                }
            }
            StoreError::Sqlx(e)
        })?;

    Ok(())
}

/// Get a roster member by login email.
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<RosterEntry> {
    let row = sqlx::query_as::<_, RosterRow>(
        "SELECT email, password, name, role, teams FROM roster WHERE email = ?",
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound {
        entity: "RosterEntry",
        id: email.to_string(),
    })?;

    row.try_into()
}

/// List all roster members.
pub async fn list_entries(pool: &SqlitePool) -> Result<Vec<RosterEntry>> {
    let rows = sqlx::query_as::<_, RosterRow>(
        "SELECT email, password, name, role, teams FROM roster ORDER BY email",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(RosterEntry::try_from).collect()
}

/// Resolve a person's email by display name, case-insensitive.
pub async fn email_for_name(pool: &SqlitePool, name: &str) -> Result<Option<String>> {
    let email: Option<(String,)> =
        sqlx::query_as("SELECT email FROM roster WHERE LOWER(name) = LOWER(?)")
            .bind(name.trim())
            .fetch_optional(pool)
            .await?;

    Ok(email.map(|(e,)| e))
}

/// Resolve the manager responsible for a team label.
///
/// Team labels are messy in practice ("AP", "AP Team", "Accounts Payable
/// (AP)"), so a manager matches when any of their team affiliations
/// contains the query or vice versa, case-insensitive.
pub async fn manager_for_team(pool: &SqlitePool, team: &str) -> Result<Option<Contact>> {
    let query = team.trim().to_lowercase();
    if query.is_empty() {
        return Ok(None);
    }

    let rows = sqlx::query_as::<_, RosterRow>(
        "SELECT email, password, name, role, teams FROM roster WHERE role = 'manager' ORDER BY email",
    )
    .fetch_all(pool)
    .await?;

    for row in rows {
        let entry: RosterEntry = row.try_into()?;
        let matches = entry.team_list().iter().any(|t| {
            let t = t.to_lowercase();
            t.contains(&query) || query.contains(&t)
        });
        if matches {
            return Ok(Some(Contact {
                name: entry.name,
                email: entry.email,
            }));
        }
    }

    Ok(None)
}

#[async_trait]
impl Directory for Store {
    async fn email_for_name(&self, name: &str) -> Option<String> {
        match email_for_name(self.pool(), name).await {
            Ok(email) => email,
            Err(err) => {
                tracing::warn!(name, error = %err, "Directory lookup failed");
                None
            }
        }
    }

    async fn manager_for_team(&self, team: &str) -> Option<Contact> {
        match manager_for_team(self.pool(), team).await {
            Ok(contact) => contact,
            Err(err) => {
                tracing::warn!(team, error = %err, "Manager lookup failed");
                None
            }
        }
    }
}
