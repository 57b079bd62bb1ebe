//! SQLite persistence layer for Querydesk.
//!
//! This crate provides async store operations for tickets, invoices and the
//! roster using SQLx with SQLite. Mutations are per-row UPDATE statements
//! keyed by ticket id; there are intentionally no cross-row transactions
//! (single-writer deployment assumption, see DESIGN.md).
//!
//! # Example
//!
//! ```no_run
//! use ticket_store::Store;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let store = Store::connect("sqlite:querydesk.db?mode=rwc").await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod invoice;
pub mod patch;
pub mod roster;
pub mod ticket;

pub use error::{Result, StoreError};
pub use invoice::{InvoiceFilter, LedgerStats};
pub use patch::{MarkerChange, TicketPatch};
pub use ticket::TicketStats;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Store connection wrapper.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Default pool size for store connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to store: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run store migrations. Call once after connecting.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Store migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Current timestamp in the store's text format.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Today's date in ISO form, used for due-date comparisons.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{Ticket, TicketStatus};

    async fn test_store() -> Store {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn sample_ticket(id: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            description: "What is the payment status of invoice INV-5?".to_string(),
            status: TicketStatus::Open,
            ticket_type: Some("Accounts Payable".to_string()),
            assigned_team: Some("AP".to_string()),
            assigned_to: Some("Robert Brown".to_string()),
            requester_name: Some("Alice Green".to_string()),
            requester_email: None,
            auto_status: None,
            ai_response: None,
            admin_review_needed: false,
            created_at: now_timestamp(),
            updated_at: None,
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_ticket_roundtrip() {
        let store = test_store().await;
        let ticket = sample_ticket("T1");
        ticket::insert_ticket(store.pool(), &ticket).await.unwrap();

        let fetched = ticket::get_ticket(store.pool(), "T1").await.unwrap();
        assert_eq!(fetched.id, "T1");
        assert_eq!(fetched.status, TicketStatus::Open);
        assert_eq!(fetched.auto_status, None);
        assert!(!fetched.admin_review_needed);
    }

    #[tokio::test]
    async fn test_get_missing_ticket_is_not_found() {
        let store = test_store().await;
        let result = ticket::get_ticket(store.pool(), "T404").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
