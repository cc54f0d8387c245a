//! User Entity

use chrono::{DateTime, Duration, Utc};
use kernel::UserRole;
use kernel::id::{ArticleId, UserId};
use platform::password::HashedPassword;

use crate::domain::value_object::{email::Email, user_name::UserName};

/// Longest accepted bio
pub const MAX_BIO_LENGTH: usize = 500;

/// Longest accepted profile image URL
pub const MAX_IMAGE_URL_LENGTH: usize = 2048;

/// User entity
///
/// Born unverified, active, with role `user`.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub user_name: UserName,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    /// Ordered, without duplicates
    pub bookmarks: Vec<ArticleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(user_name: UserName, email: Email, password_hash: HashedPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            user_name,
            email,
            password_hash,
            role: UserRole::User,
            is_active: true,
            is_verified: false,
            bio: None,
            profile_image: None,
            bookmarks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Unverified and older than the verification horizon.
    pub fn is_stale_unverified(&self, now: DateTime<Utc>, horizon: Duration) -> bool {
        !self.is_verified && self.created_at < now - horizon
    }
}
