//! Auth Middleware
//!
//! - `require_auth`: bearer access token required, caller stored in extensions
//! - `optional_auth`: attaches the caller when a valid token is present
//! - `require_role`: runs after `require_auth`, 403 unless the role is allowed
//! - `rate_limit`: fixed window per client IP

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::{CurrentUser, UserRole};
use platform::client::ClientMetadata;
use platform::rate_limit::{RateLimitConfig, RateLimitStore};
use platform::token::TokenService;

use crate::application::authenticate;
use crate::error::AuthError;

pub const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::SuperAdmin];
pub const SUPER_ADMIN_ROLES: &[UserRole] = &[UserRole::SuperAdmin];

/// Middleware state: the token service used to validate access tokens
#[derive(Clone)]
pub struct AuthGuard {
    tokens: Arc<TokenService>,
}

impl AuthGuard {
    pub fn new(tokens: TokenService) -> Self {
        Self {
            tokens: Arc::new(tokens),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware that requires a valid access token
pub async fn require_auth(
    State(guard): State<AuthGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::Unauthorized)?;
    let caller = authenticate(&guard.tokens, token)?;

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Middleware that identifies the caller when possible but never rejects
pub async fn optional_auth(
    State(guard): State<AuthGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    let caller =
        bearer_token(req.headers()).and_then(|token| authenticate(&guard.tokens, token).ok());
    if let Some(caller) = caller {
        req.extensions_mut().insert(caller);
    }
    next.run(req).await
}

/// Middleware that restricts a route to the given roles
pub async fn require_role(
    State(allowed): State<&'static [UserRole]>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let caller = req
        .extensions()
        .get::<CurrentUser>()
        .copied()
        .ok_or(AuthError::Unauthorized)?;

    if !allowed.contains(&caller.role) {
        tracing::warn!(
            user_id = %caller.user_id,
            role = caller.role.code(),
            path = %req.uri().path(),
            "Role denied"
        );
        return Err(AuthError::Forbidden);
    }
    Ok(next.run(req).await)
}

/// Rate limiter state
pub struct RateLimitState<S> {
    pub store: Arc<S>,
    pub config: RateLimitConfig,
}

impl<S> RateLimitState<S> {
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }
}

impl<S> Clone for RateLimitState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

/// Middleware that enforces the per-client request budget
pub async fn rate_limit<S>(
    State(state): State<RateLimitState<S>>,
    client: ClientMetadata,
    req: Request,
    next: Next,
) -> Response
where
    S: RateLimitStore + Sync + 'static,
{
    let key = format!("{}:{}", req.uri().path(), client.client_key());
    match state.store.check_and_increment(&key, &state.config).await {
        Ok(result) if !result.allowed => {
            tracing::warn!(key = %key, "Rate limit exceeded");
            let mut response = AuthError::RateLimited.into_response();
            let retry_after = result.reset_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        Ok(_) => next.run(req).await,
        Err(e) => {
            // Fail open on store errors.
            tracing::error!(error = %e, "Rate limit store failed");
            next.run(req).await
        }
    }
}
