//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::PageRequest;
use kernel::UserRole;
use kernel::id::{ArticleId, EmailTokenId, RefreshTokenId, UserId};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{EmailToken, EmailTokenKind, EmailTokenPurpose, RefreshToken, User};
use crate::domain::repository::{EmailTokenRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

const USERS_EMAIL_KEY: &str = "users_email_key";
const USERS_USER_NAME_KEY: &str = "users_user_name_key";

/// PostgreSQL-backed identity store (users, refresh tokens, email tokens)
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate unique violations on the users table into domain errors.
fn map_user_write_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        match db.constraint() {
            Some(USERS_EMAIL_KEY) => return AuthError::EmailTaken,
            Some(USERS_USER_NAME_KEY) => return AuthError::UsernameTaken,
            _ => {}
        }
    }
    AuthError::Database(err)
}

const USER_COLUMNS: &str = r#"
    user_id,
    user_name,
    email,
    password_hash,
    user_role,
    is_active,
    is_verified,
    bio,
    profile_image,
    bookmarks,
    created_at,
    updated_at
"#;

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgIdentityRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                email,
                password_hash,
                user_role,
                is_active,
                is_verified,
                bio,
                profile_image,
                bookmarks,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.role.id())
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(&user.bio)
        .bind(&user.profile_image)
        .bind(bookmark_uuids(&user.bookmarks))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = $1"
        ))
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_name = $1)",
        )
        .bind(user_name.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                user_name = $2,
                email = $3,
                password_hash = $4,
                user_role = $5,
                is_active = $6,
                is_verified = $7,
                bio = $8,
                profile_image = $9,
                updated_at = $10
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.role.id())
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(&user.bio)
        .bind(&user.profile_image)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list(&self, page: &PageRequest) -> AuthResult<(Vec<User>, u64)> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, user_id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = rows
            .into_iter()
            .map(UserRow::into_user)
            .collect::<AuthResult<Vec<_>>>()?;
        Ok((users, total.max(0) as u64))
    }

    async fn add_bookmark(&self, user_id: UserId, article_id: ArticleId) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                bookmarks = CASE
                    WHEN $2 = ANY(bookmarks) THEN bookmarks
                    ELSE array_append(bookmarks, $2)
                END,
                updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(article_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn remove_bookmark(&self, user_id: UserId, article_id: ArticleId) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                bookmarks = array_remove(bookmarks, $2),
                updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(article_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn delete_unverified_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let deleted =
            sqlx::query("DELETE FROM users WHERE is_verified = false AND created_at < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Refresh Token Repository Implementation
// ============================================================================

impl RefreshTokenRepository for PgIdentityRepository {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                id,
                user_id,
                token_hash,
                device,
                ip,
                user_agent,
                revoked,
                revoked_at,
                expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(token.id.as_uuid())
        .bind(token.user_id.as_uuid())
        .bind(&token.token_hash)
        .bind(&token.device)
        .bind(&token.ip)
        .bind(&token.user_agent)
        .bind(token.revoked)
        .bind(token.revoked_at)
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT
                id,
                user_id,
                token_hash,
                device,
                ip,
                user_agent,
                revoked,
                revoked_at,
                expires_at,
                created_at,
                updated_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RefreshTokenRow::into_token))
    }

    async fn revoke_if_active(&self, id: RefreshTokenId, now: DateTime<Utc>) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE refresh_tokens SET
                revoked = true,
                revoked_at = $2,
                updated_at = $2
            WHERE id = $1 AND revoked = false
            "#,
        )
        .bind(id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn revoke_by_hash(&self, token_hash: &str, now: DateTime<Utc>) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE refresh_tokens SET
                revoked = true,
                revoked_at = $2,
                updated_at = $2
            WHERE token_hash = $1 AND revoked = false
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn revoke_all_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> AuthResult<u64> {
        let updated = sqlx::query(
            r#"
            UPDATE refresh_tokens SET
                revoked = true,
                revoked_at = $2,
                updated_at = $2
            WHERE user_id = $1 AND revoked = false
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_revoked_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let deleted =
            sqlx::query("DELETE FROM refresh_tokens WHERE revoked = true AND revoked_at < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Email Token Repository Implementation
// ============================================================================

impl EmailTokenRepository for PgIdentityRepository {
    async fn create(&self, token: &EmailToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_tokens (
                id,
                user_id,
                token_hash,
                purpose,
                new_email,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.id.as_uuid())
        .bind(token.user_id.as_uuid())
        .bind(&token.token_hash)
        .bind(token.purpose.id())
        .bind(token.purpose.new_email().map(|e| e.as_str()))
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn take(&self, token_hash: &str, kind: EmailTokenKind) -> AuthResult<Option<EmailToken>> {
        let row = sqlx::query_as::<_, EmailTokenRow>(
            r#"
            DELETE FROM email_tokens
            WHERE token_hash = $1 AND purpose = $2
            RETURNING
                id,
                user_id,
                token_hash,
                purpose,
                new_email,
                expires_at,
                created_at
            "#,
        )
        .bind(token_hash)
        .bind(kind.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(EmailTokenRow::into_token).transpose()
    }

    async fn delete_for_user(&self, user_id: UserId, kind: EmailTokenKind) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM email_tokens WHERE user_id = $1 AND purpose = $2")
            .bind(user_id.as_uuid())
            .bind(kind.id())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_all_for_user(&self, user_id: UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM email_tokens WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM email_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

fn bookmark_uuids(bookmarks: &[ArticleId]) -> Vec<Uuid> {
    bookmarks.iter().map(|id| id.into_uuid()).collect()
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    email: String,
    password_hash: String,
    user_role: i16,
    is_active: bool,
    is_verified: bool,
    bio: Option<String>,
    profile_image: Option<String>,
    bookmarks: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_id(self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {}", self.user_role)))?;
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password_hash: {}", e)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            password_hash,
            role,
            is_active: self.is_active,
            is_verified: self.is_verified,
            bio: self.bio,
            profile_image: self.profile_image,
            bookmarks: self.bookmarks.into_iter().map(ArticleId::from_uuid).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    device: String,
    ip: Option<String>,
    user_agent: Option<String>,
    revoked: bool,
    revoked_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RefreshTokenRow {
    fn into_token(self) -> RefreshToken {
        RefreshToken {
            id: RefreshTokenId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            token_hash: self.token_hash,
            device: self.device,
            ip: self.ip,
            user_agent: self.user_agent,
            revoked: self.revoked,
            revoked_at: self.revoked_at,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EmailTokenRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    purpose: i16,
    new_email: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl EmailTokenRow {
    fn into_token(self) -> AuthResult<EmailToken> {
        let purpose = match (self.purpose, self.new_email) {
            (0, _) => EmailTokenPurpose::Verify,
            (1, _) => EmailTokenPurpose::PasswordReset,
            (2, Some(new_email)) => EmailTokenPurpose::EmailChange {
                new_email: Email::from_db(new_email),
            },
            (id, _) => {
                return Err(AuthError::Internal(format!("Invalid email token purpose: {}", id)));
            }
        };

        Ok(EmailToken {
            id: EmailTokenId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            token_hash: self.token_hash,
            purpose,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}
