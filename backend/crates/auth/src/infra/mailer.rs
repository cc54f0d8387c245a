//! Log Mailer
//!
//! Mail transport for development and deployments without SMTP: records the
//! recipient and subject, never the body (it carries single-use codes).

use crate::domain::mailer::{MailError, Mailer, OutgoingMail};

#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "Outgoing mail");
        Ok(())
    }
}
