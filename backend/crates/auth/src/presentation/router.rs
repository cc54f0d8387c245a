//! Identity Router

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::{
    Router,
    routing::{get, patch, post, put},
};
use platform::rate_limit::{InMemoryRateLimitStore, RateLimitConfig, RateLimitStore};

use crate::application::config::AuthConfig;
use crate::domain::mailer::Mailer;
use crate::domain::repository::IdentityStore;
use crate::infra::{LogMailer, PgIdentityRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    ADMIN_ROLES, AuthGuard, RateLimitState, rate_limit, require_auth, require_role,
};

/// Create the identity router with the PostgreSQL store and log mailer
pub fn identity_router(
    repo: PgIdentityRepository,
    mailer: LogMailer,
    config: AuthConfig,
    rate_limit_config: RateLimitConfig,
) -> Router {
    identity_router_generic(
        Arc::new(repo),
        Arc::new(mailer),
        Arc::new(config),
        RateLimitState::new(Arc::new(InMemoryRateLimitStore::new()), rate_limit_config),
    )
}

/// Create the identity router for any store / mailer / limiter implementation
///
/// - `/auth/*`: public, rate limited
/// - `/users/*`: bearer token required
/// - `/admin/users*`: bearer token with an admin role required
pub fn identity_router_generic<R, M, L>(
    repo: Arc<R>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
    limiter: RateLimitState<L>,
) -> Router
where
    R: IdentityStore,
    M: Mailer + Sync + 'static,
    L: RateLimitStore + Sync + 'static,
{
    let guard = AuthGuard::new(config.token_service());
    let state = AuthAppState {
        repo,
        mailer,
        config,
    };

    let public = Router::new()
        .route("/auth/register", post(handlers::register::<R, M>))
        .route("/auth/verify", get(handlers::verify_email::<R, M>))
        .route(
            "/auth/resend-verification",
            post(handlers::resend_verification::<R, M>),
        )
        .route("/auth/login", post(handlers::login::<R, M>))
        .route("/auth/logout", post(handlers::logout::<R, M>))
        .route("/auth/refresh", post(handlers::refresh::<R, M>))
        .route(
            "/auth/forget-password",
            post(handlers::forgot_password::<R, M>),
        )
        .route(
            "/auth/reset-password",
            post(handlers::reset_password::<R, M>),
        )
        .route(
            "/auth/verify-email-change",
            get(handlers::verify_email_change::<R, M>),
        )
        .route_layer(from_fn_with_state(limiter, rate_limit::<L>));

    let account = Router::new()
        .route(
            "/users/me",
            get(handlers::get_me::<R, M>).patch(handlers::update_me::<R, M>),
        )
        .route("/users/username", patch(handlers::update_user_name::<R, M>))
        .route("/users/email", patch(handlers::update_email::<R, M>))
        .route("/users/password", put(handlers::change_password::<R, M>))
        .route(
            "/users/me/bookmarks/{article_id}",
            put(handlers::add_bookmark::<R, M>).delete(handlers::remove_bookmark::<R, M>),
        )
        .route_layer(from_fn_with_state(guard.clone(), require_auth));

    // Layers run outside-in: authentication first, then the role check.
    let admin = Router::new()
        .route("/admin/users", get(handlers::admin_list_users::<R, M>))
        .route(
            "/admin/users/{user_id}",
            get(handlers::admin_get_user::<R, M>).delete(handlers::admin_delete_user::<R, M>),
        )
        .route(
            "/admin/users/{user_id}/active",
            patch(handlers::admin_set_active::<R, M>),
        )
        .route(
            "/admin/users/{user_id}/role",
            patch(handlers::admin_set_role::<R, M>),
        )
        .route_layer(from_fn_with_state(ADMIN_ROLES, require_role))
        .route_layer(from_fn_with_state(guard, require_auth));

    public.merge(account).merge(admin).with_state(state)
}
