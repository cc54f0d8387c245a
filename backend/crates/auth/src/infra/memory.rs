//! In-memory identity store and mailers for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use kernel::PageRequest;
use kernel::id::{ArticleId, RefreshTokenId, UserId};

use crate::domain::entity::{EmailToken, EmailTokenKind, RefreshToken, User};
use crate::domain::mailer::{MailError, Mailer, OutgoingMail};
use crate::domain::repository::{EmailTokenRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    refresh_tokens: Vec<RefreshToken>,
    email_tokens: Vec<EmailToken>,
}

#[derive(Default)]
pub struct MemoryIdentityStore {
    state: Mutex<State>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_tokens_of(&self, user_id: UserId) -> Vec<RefreshToken> {
        let state = self.state.lock().unwrap();
        state
            .refresh_tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn email_token_count(&self) -> usize {
        self.state.lock().unwrap().email_tokens.len()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    /// Test hook: mutate a stored user in place.
    pub fn edit_user(&self, user_id: UserId, f: impl FnOnce(&mut User)) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.get_mut(&user_id) {
            f(user);
        }
    }
}

fn check_unique(state: &State, user: &User) -> AuthResult<()> {
    for other in state.users.values().filter(|u| u.user_id != user.user_id) {
        if other.email == user.email {
            return Err(AuthError::EmailTaken);
        }
        if other.user_name == user.user_name {
            return Err(AuthError::UsernameTaken);
        }
    }
    Ok(())
}

impl UserRepository for MemoryIdentityStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        check_unique(&state, user)?;
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| &u.user_name == user_name).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().any(|u| &u.email == email))
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().any(|u| &u.user_name == user_name))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&user.user_id) {
            return Err(AuthError::UserNotFound);
        }
        check_unique(&state, user)?;
        // Bookmarks are only written through the dedicated operations.
        let bookmarks = state.users[&user.user_id].bookmarks.clone();
        let mut stored = user.clone();
        stored.bookmarks = bookmarks;
        state.users.insert(user.user_id, stored);
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> AuthResult<bool> {
        Ok(self.state.lock().unwrap().users.remove(&user_id).is_some())
    }

    async fn list(&self, page: &PageRequest) -> AuthResult<(Vec<User>, u64)> {
        let state = self.state.lock().unwrap();
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = users.len() as u64;
        let items = users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn add_bookmark(&self, user_id: UserId, article_id: ArticleId) -> AuthResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        if !user.bookmarks.contains(&article_id) {
            user.bookmarks.push(article_id);
        }
        Ok(true)
    }

    async fn remove_bookmark(&self, user_id: UserId, article_id: ArticleId) -> AuthResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        user.bookmarks.retain(|id| *id != article_id);
        Ok(true)
    }

    async fn delete_unverified_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.users.len();
        state
            .users
            .retain(|_, u| u.is_verified || u.created_at >= cutoff);
        Ok((before - state.users.len()) as u64)
    }
}

impl RefreshTokenRepository for MemoryIdentityStore {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        self.state.lock().unwrap().refresh_tokens.push(token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .refresh_tokens
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_if_active(&self, id: RefreshTokenId, now: DateTime<Utc>) -> AuthResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state
            .refresh_tokens
            .iter_mut()
            .find(|t| t.id == id && !t.revoked)
        {
            Some(token) => {
                token.revoke(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_by_hash(&self, token_hash: &str, now: DateTime<Utc>) -> AuthResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state
            .refresh_tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && !t.revoked)
        {
            Some(token) => {
                token.revoke(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().unwrap();
        let mut count = 0;
        for token in state
            .refresh_tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id && !t.revoked)
        {
            token.revoke(now);
            count += 1;
        }
        Ok(count)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|t| !t.is_expired(now));
        Ok((before - state.refresh_tokens.len()) as u64)
    }

    async fn delete_revoked_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.refresh_tokens.len();
        state
            .refresh_tokens
            .retain(|t| !(t.revoked && t.revoked_at.is_some_and(|at| at < cutoff)));
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}

impl EmailTokenRepository for MemoryIdentityStore {
    async fn create(&self, token: &EmailToken) -> AuthResult<()> {
        self.state.lock().unwrap().email_tokens.push(token.clone());
        Ok(())
    }

    async fn take(&self, token_hash: &str, kind: EmailTokenKind) -> AuthResult<Option<EmailToken>> {
        let mut state = self.state.lock().unwrap();
        let position = state
            .email_tokens
            .iter()
            .position(|t| t.token_hash == token_hash && t.kind() == kind);
        Ok(position.map(|i| state.email_tokens.remove(i)))
    }

    async fn delete_for_user(&self, user_id: UserId, kind: EmailTokenKind) -> AuthResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.email_tokens.len();
        state
            .email_tokens
            .retain(|t| !(t.user_id == user_id && t.kind() == kind));
        Ok((before - state.email_tokens.len()) as u64)
    }

    async fn delete_all_for_user(&self, user_id: UserId) -> AuthResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.email_tokens.len();
        state.email_tokens.retain(|t| t.user_id != user_id);
        Ok((before - state.email_tokens.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.email_tokens.len();
        state.email_tokens.retain(|t| !t.is_expired(now));
        Ok((before - state.email_tokens.len()) as u64)
    }
}

/// Keeps every mail so tests can read the codes back.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    /// The `code` query value of the newest mail sent to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let mail = sent.iter().rev().find(|m| m.to.as_str() == to)?;
        let start = mail.body.find("?code=")? + "?code=".len();
        let code: String = mail.body[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        Some(code)
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

#[derive(Default)]
pub struct FailingMailer;

impl Mailer for FailingMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<(), MailError> {
        Err(MailError::Unavailable)
    }
}
