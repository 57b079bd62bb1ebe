//! SMTP send path.

use lettre::{
    message::{header::ContentType, Attachment as LettreAttachment, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use triage_core::{async_trait, Notification, Notifier, NotifyError};

use crate::SmtpConfig;

/// Notifier that delivers over SMTP.
pub struct MailNotifier {
    config: SmtpConfig,
}

impl MailNotifier {
    /// Create a new notifier with the given configuration.
    pub fn new(config: SmtpConfig) -> Self {
        info!(
            host = %config.host,
            port = config.port,
            username = %config.username,
            "Created SMTP notifier"
        );
        Self { config }
    }

    /// Create a notifier from environment variables.
    pub fn from_env() -> Result<Self, NotifyError> {
        Ok(Self::new(SmtpConfig::from_env()?))
    }

    /// Build a transport for one send. Sessions are not reused.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
            .map_err(|e| NotifyError::Configuration(e.to_string()))?
            .port(self.config.port)
            .credentials(creds)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build();

        Ok(transport)
    }

    /// Build a lettre Message from a notification.
    ///
    /// An unreadable attachment is logged and skipped; the body still goes
    /// out.
    fn build_message(&self, note: &Notification) -> Result<Message, NotifyError> {
        let from = self
            .config
            .username
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("From: {}", e)))?;
        let to = note
            .to
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("To '{}': {}", note.to, e)))?;

        let builder = Message::builder().from(from).to(to).subject(&note.subject);

        let attachment = note.attachment.as_deref().and_then(load_attachment);

        let message = match attachment {
            Some(part) => builder
                .multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(note.body.clone()))
                        .singlepart(part),
                )
                .map_err(|e| NotifyError::BuildMessage(e.to_string()))?,
            None => builder
                .body(note.body.clone())
                .map_err(|e| NotifyError::BuildMessage(e.to_string()))?,
        };

        Ok(message)
    }
}

/// Load a file into an attachment part, or `None` when it cannot be read.
fn load_attachment(path: &Path) -> Option<SinglePart> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Attachment unreadable, sending body only");
            return None;
        }
    };

    let filename = path.file_name()?.to_str()?.to_string();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let content_type: ContentType = match mime.essence_str().parse() {
        Ok(ct) => ct,
        Err(_) => {
            warn!(path = %path.display(), "Unknown attachment content type, sending body only");
            return None;
        }
    };

    debug!(filename = %filename, mime = %mime, "Adding attachment");
    Some(LettreAttachment::new(filename).body(data, content_type))
}

#[async_trait]
impl Notifier for MailNotifier {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError> {
        let message = self.build_message(note)?;
        let transport = self.transport()?;

        transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        info!(to = %note.to, subject = %note.subject, "Notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_notifier() -> MailNotifier {
        MailNotifier::new(SmtpConfig::new("localhost", 2525, "bot@example.com", "pw"))
    }

    #[test]
    fn test_build_plain_message() {
        let notifier = test_notifier();
        let note = Notification::new("user@example.com", "Ticket T1 Resolved", "All done.");
        assert!(notifier.build_message(&note).is_ok());
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let notifier = test_notifier();
        let note = Notification::new("not an address", "Subject", "Body");
        let err = notifier.build_message(&note).unwrap_err();
        assert!(matches!(err, NotifyError::InvalidAddress(_)));
    }

    #[test]
    fn test_missing_attachment_degrades_to_body_only() {
        let notifier = test_notifier();
        let note = Notification::new("user@example.com", "Subject", "Body")
            .with_attachment("/nonexistent/file.txt".into());
        // Message still builds; the attachment is silently dropped.
        assert!(notifier.build_message(&note).is_ok());
    }
}
