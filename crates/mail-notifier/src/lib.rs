//! SMTP notifier for Querydesk.
//!
//! Implements [`triage_core::Notifier`] over SMTP with STARTTLS. Each send
//! opens and tears down its own session; there is no connection pooling to
//! maintain across calls. A missing or unreadable attachment degrades to a
//! body-only send instead of failing the notification.

mod client;
mod config;

pub use client::MailNotifier;
pub use config::SmtpConfig;
