//! Outgoing mail templates

use crate::application::config::AuthConfig;
use crate::domain::mailer::OutgoingMail;
use crate::domain::value_object::email::Email;

pub const VERIFY_PATH: &str = "/auth/verify";
pub const RESET_PATH: &str = "/auth/reset-password";
pub const EMAIL_CHANGE_PATH: &str = "/auth/verify-email-change";

pub fn verification(config: &AuthConfig, to: &Email, token: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.clone(),
        subject: "Verify your email address".to_string(),
        body: format!(
            "Welcome!\n\nConfirm your address by opening:\n{}\n\nThe link expires in {} hours.",
            config.link(VERIFY_PATH, token),
            config.verification_ttl.num_hours()
        ),
    }
}

pub fn password_reset(config: &AuthConfig, to: &Email, token: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.clone(),
        subject: "Reset your password".to_string(),
        body: format!(
            "Someone asked to reset the password for this account.\n\n\
             Reset code: {}\nLink: {}\n\n\
             The code expires in {} minutes. Ignore this mail if it was not you.",
            token,
            config.link(RESET_PATH, token),
            config.password_reset_ttl.num_minutes()
        ),
    }
}

pub fn email_change(config: &AuthConfig, to: &Email, token: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.clone(),
        subject: "Confirm your new email address".to_string(),
        body: format!(
            "Confirm this address for your account by opening:\n{}",
            config.link(EMAIL_CHANGE_PATH, token)
        ),
    }
}
