//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::UserRole;
use kernel::id::{ArticleId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::SessionTokens;
use crate::domain::entity::User;

// ============================================================================
// Registration / Verification
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "username")]
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub message: &'static str,
}

/// `?code=` carried by links in outgoing mail
#[derive(Debug, Clone, Deserialize)]
pub struct CodeQuery {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

// ============================================================================
// Session
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Email or user name
    pub identifier: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionTokens> for TokenResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer",
            expires_at: tokens.expires_at,
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenResponse,
    pub user: UserResponse,
}

// ============================================================================
// Password
// ============================================================================

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(alias = "token")]
    pub code: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserNameRequest {
    #[serde(alias = "username")]
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub bookmarks: Vec<ArticleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role,
            is_active: user.is_active,
            is_verified: user.is_verified,
            bio: user.bio,
            profile_image: user.profile_image,
            bookmarks: user.bookmarks,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
