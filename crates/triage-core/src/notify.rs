//! Notification trait seam.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A recipient address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Building the message failed.
    #[error("failed to build message: {0}")]
    BuildMessage(String),

    /// The transport rejected or failed the send.
    #[error("send failed: {0}")]
    Send(String),
}

/// A message to one recipient with an optional single file attachment.
#[derive(Debug, Clone)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Path of a file to attach. An unreadable path degrades to a
    /// body-only send rather than failing the notification.
    pub attachment: Option<PathBuf>,
}

impl Notification {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, path: PathBuf) -> Self {
        self.attachment = Some(path);
        self
    }
}

/// Trait for notification transports.
///
/// Callers treat a send failure as a degraded outcome, never as a reason
/// to roll back store updates.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError>;
}
