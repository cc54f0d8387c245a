//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::{ArticleId, UserId};
use kernel::{CurrentUser, Page, PageRequest};
use platform::client::ClientMetadata;

use crate::application::{
    AdminUserUseCase, AuthConfig, ChangePasswordUseCase, ForgotPasswordUseCase, LoginInput,
    LoginUseCase, LogoutUseCase, ProfileChanges, ProfileUseCase, RefreshUseCase, RegisterInput,
    RegisterUseCase, ResendVerificationUseCase, ResetPasswordUseCase, UpdateEmailUseCase,
    VerifyEmailUseCase, VerifyUpdateEmailUseCase,
};
use crate::domain::mailer::Mailer;
use crate::domain::repository::IdentityStore;
use crate::error::AuthResult;
use crate::presentation::dto::{
    ChangePasswordRequest, CodeQuery, EmailRequest, LoginRequest, LoginResponse, MessageResponse,
    RefreshTokenRequest, RegisterRequest, RegisterResponse, ResetPasswordRequest,
    SetActiveRequest, SetRoleRequest, TokenResponse, UpdateProfileRequest, UpdateUserNameRequest,
    UserResponse,
};

/// Shared state for identity handlers
pub struct AuthAppState<R, M>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
}

impl<R, M> Clone for AuthAppState<R, M>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Registration / Verification
// ============================================================================

/// POST /auth/register
pub async fn register<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            user_name: req.user_name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: output.user_id,
            message: "Check your inbox to verify your email address",
        }),
    ))
}

/// GET /auth/verify?code=
pub async fn verify_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(query): Query<CodeQuery>,
) -> AuthResult<Json<MessageResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.execute(&query.code).await?;

    Ok(Json(MessageResponse::new("Email verified")))
}

/// POST /auth/resend-verification
pub async fn resend_verification<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<EmailRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = ResendVerificationUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.execute(&req.email).await?;

    Ok(Json(MessageResponse::new(
        "If the address is registered and unverified, a new link has been sent",
    )))
}

// ============================================================================
// Session
// ============================================================================

/// POST /auth/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    client: ClientMetadata,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(
            LoginInput {
                identifier: req.identifier,
                password: req.password,
            },
            client,
        )
        .await?;

    Ok(Json(LoginResponse {
        tokens: output.tokens.into(),
        user: output.user.into(),
    }))
}

/// POST /auth/refresh
pub async fn refresh<R, M>(
    State(state): State<AuthAppState<R, M>>,
    client: ClientMetadata,
    Json(req): Json<RefreshTokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = RefreshUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );
    let tokens = use_case.execute(&req.refresh_token, client).await?;

    Ok(Json(tokens.into()))
}

/// POST /auth/logout
pub async fn logout<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<RefreshTokenRequest>,
) -> AuthResult<StatusCode>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.repo.clone());
    use_case.execute(&req.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Password
// ============================================================================

/// POST /auth/forget-password
pub async fn forgot_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<EmailRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.execute(&req.email).await?;

    Ok(Json(MessageResponse::new(
        "If the address is registered, a reset link has been sent",
    )))
}

/// POST /auth/reset-password
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );
    use_case.execute(&req.code, req.new_password).await?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// PUT /users/password
pub async fn change_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case =
        ChangePasswordUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    use_case
        .execute(caller.user_id, req.old_password, req.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Email change
// ============================================================================

/// PATCH /users/email
pub async fn update_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Json(req): Json<EmailRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = UpdateEmailUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.execute(caller.user_id, &req.email).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Confirm the change from the link sent to the new address")),
    ))
}

/// GET /auth/verify-email-change?code=
pub async fn verify_email_change<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(query): Query<CodeQuery>,
) -> AuthResult<Json<MessageResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let use_case = VerifyUpdateEmailUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.execute(&query.code).await?;

    Ok(Json(MessageResponse::new("Email updated")))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /users/me
pub async fn get_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let user = ProfileUseCase::new(state.repo.clone())
        .get_me(caller.user_id)
        .await?;
    Ok(Json(user.into()))
}

/// PATCH /users/me
pub async fn update_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let user = ProfileUseCase::new(state.repo.clone())
        .update_profile(
            caller.user_id,
            ProfileChanges {
                bio: req.bio,
                profile_image: req.profile_image,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

/// PATCH /users/username
pub async fn update_user_name<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Json(req): Json<UpdateUserNameRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let user = ProfileUseCase::new(state.repo.clone())
        .update_user_name(caller.user_id, &req.user_name)
        .await?;
    Ok(Json(user.into()))
}

/// PUT /users/me/bookmarks/{article_id}
pub async fn add_bookmark<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Path(article_id): Path<ArticleId>,
) -> AuthResult<StatusCode>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    ProfileUseCase::new(state.repo.clone())
        .add_bookmark(caller.user_id, article_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/me/bookmarks/{article_id}
pub async fn remove_bookmark<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Path(article_id): Path<ArticleId>,
) -> AuthResult<StatusCode>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    ProfileUseCase::new(state.repo.clone())
        .remove_bookmark(caller.user_id, article_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin
// ============================================================================

fn admin_use_case<R, M>(state: &AuthAppState<R, M>) -> AdminUserUseCase<R, R, R>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    AdminUserUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone())
}

/// GET /admin/users
pub async fn admin_list_users<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(page): Query<PageRequest>,
) -> AuthResult<Json<Page<UserResponse>>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let page = admin_use_case(&state).list(page).await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// GET /admin/users/{user_id}
pub async fn admin_get_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(user_id): Path<UserId>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let user = admin_use_case(&state).get(user_id).await?;
    Ok(Json(user.into()))
}

/// PATCH /admin/users/{user_id}/active
pub async fn admin_set_active<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Path(user_id): Path<UserId>,
    Json(req): Json<SetActiveRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let user = admin_use_case(&state)
        .set_active(&caller, user_id, req.active)
        .await?;
    Ok(Json(user.into()))
}

/// PATCH /admin/users/{user_id}/role
pub async fn admin_set_role<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Path(user_id): Path<UserId>,
    Json(req): Json<SetRoleRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    let user = admin_use_case(&state)
        .set_role(&caller, user_id, req.role)
        .await?;
    Ok(Json(user.into()))
}

/// DELETE /admin/users/{user_id}
pub async fn admin_delete_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: CurrentUser,
    Path(user_id): Path<UserId>,
) -> AuthResult<StatusCode>
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
{
    admin_use_case(&state).delete(&caller, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
