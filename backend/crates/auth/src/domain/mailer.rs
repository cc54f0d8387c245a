//! Mailer Port
//!
//! Outgoing mail is an external collaborator; the transport is chosen at
//! startup.

use std::fmt;

use thiserror::Error;

use crate::domain::value_object::email::Email;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport rejected the message: {0}")]
    Rejected(String),
    #[error("Mail transport unavailable")]
    Unavailable,
}

#[derive(Clone)]
pub struct OutgoingMail {
    pub to: Email,
    pub subject: String,
    /// Contains single-use links; never logged
    pub body: String,
}

impl fmt::Debug for OutgoingMail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutgoingMail")
            .field("to", &self.to)
            .field("subject", &self.subject)
            .field("body", &"[REDACTED]")
            .finish()
    }
}

#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}
