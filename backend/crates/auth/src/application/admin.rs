//! Admin User Management
//!
//! Role rules:
//! - a `super_admin` account is immutable through this API
//! - only a `super_admin` may grant or revoke `admin`
//! - nobody can be promoted to `super_admin`

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;
use kernel::{CurrentUser, Page, PageRequest, UserRole};

use crate::domain::entity::User;
use crate::domain::repository::{EmailTokenRepository, RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct AdminUserUseCase<U, R, E>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    E: EmailTokenRepository,
{
    user_repo: Arc<U>,
    refresh_repo: Arc<R>,
    token_repo: Arc<E>,
}

impl<U, R, E> AdminUserUseCase<U, R, E>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    E: EmailTokenRepository,
{
    pub fn new(user_repo: Arc<U>, refresh_repo: Arc<R>, token_repo: Arc<E>) -> Self {
        Self {
            user_repo,
            refresh_repo,
            token_repo,
        }
    }

    pub async fn list(&self, page: PageRequest) -> AuthResult<Page<User>> {
        let page = page.normalized();
        let (users, total) = self.user_repo.list(&page).await?;
        Ok(Page::new(users, total, page))
    }

    pub async fn get(&self, user_id: UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Deactivation also ends every open session of the target.
    pub async fn set_active(
        &self,
        caller: &CurrentUser,
        user_id: UserId,
        active: bool,
    ) -> AuthResult<User> {
        let mut user = self.get(user_id).await?;
        ensure_may_manage(caller, &user)?;

        if user.is_active != active {
            user.is_active = active;
            user.touch();
            self.user_repo.update(&user).await?;
        }
        if !active {
            self.refresh_repo.revoke_all_for_user(user_id, Utc::now()).await?;
        }

        tracing::info!(
            admin_id = %caller.user_id,
            user_id = %user_id,
            active,
            "User active flag set"
        );
        Ok(user)
    }

    pub async fn set_role(
        &self,
        caller: &CurrentUser,
        user_id: UserId,
        role: UserRole,
    ) -> AuthResult<User> {
        let mut user = self.get(user_id).await?;
        ensure_may_manage(caller, &user)?;

        if role == UserRole::SuperAdmin {
            return Err(AuthError::Forbidden);
        }
        let touches_admin = role == UserRole::Admin || user.role == UserRole::Admin;
        if touches_admin && !caller.role.is_super_admin() {
            tracing::warn!(
                admin_id = %caller.user_id,
                user_id = %user_id,
                "Admin role change attempted without super_admin"
            );
            return Err(AuthError::Forbidden);
        }

        if user.role != role {
            user.role = role;
            user.touch();
            self.user_repo.update(&user).await?;
            // Access tokens carry the role; make the user pick up the new one.
            self.refresh_repo.revoke_all_for_user(user_id, Utc::now()).await?;
        }

        tracing::info!(
            admin_id = %caller.user_id,
            user_id = %user_id,
            role = role.code(),
            "User role set"
        );
        Ok(user)
    }

    pub async fn delete(&self, caller: &CurrentUser, user_id: UserId) -> AuthResult<()> {
        let user = self.get(user_id).await?;
        ensure_may_manage(caller, &user)?;

        self.refresh_repo.revoke_all_for_user(user_id, Utc::now()).await?;
        self.token_repo.delete_all_for_user(user_id).await?;
        if !self.user_repo.delete(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(admin_id = %caller.user_id, user_id = %user_id, "User deleted");
        Ok(())
    }
}

fn ensure_may_manage(caller: &CurrentUser, target: &User) -> AuthResult<()> {
    if target.role == UserRole::SuperAdmin {
        return Err(AuthError::Forbidden);
    }
    if target.role == UserRole::Admin && !caller.role.is_super_admin() {
        return Err(AuthError::Forbidden);
    }
    if caller.user_id == target.user_id {
        // No self-management through the admin surface.
        return Err(AuthError::Forbidden);
    }
    Ok(())
}
