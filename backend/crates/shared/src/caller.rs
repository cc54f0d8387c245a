//! Caller identity
//!
//! The authentication middleware validates the bearer token and stores a
//! [`CurrentUser`] in the request extensions. Handlers read it back through the
//! extractors below (behind the `axum` feature).

use crate::id::UserId;
use crate::role::UserRole;

/// Authenticated caller attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin_or_higher()
    }

    /// Owner of the resource, or an admin acting on it.
    #[inline]
    pub fn can_act_on(&self, owner: UserId) -> bool {
        self.user_id == owner || self.is_admin()
    }
}

/// Caller when present, for routes that serve anonymous and signed-in readers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalCaller(pub Option<CurrentUser>);

#[cfg(feature = "axum")]
mod extract {
    use axum::extract::FromRequestParts;
    use axum::http::request::Parts;

    use super::{CurrentUser, OptionalCaller};
    use crate::error::app_error::AppError;

    impl<S> FromRequestParts<S> for CurrentUser
    where
        S: Send + Sync,
    {
        type Rejection = AppError;

        async fn from_request_parts(
            parts: &mut Parts,
            _state: &S,
        ) -> Result<Self, Self::Rejection> {
            parts
                .extensions
                .get::<CurrentUser>()
                .copied()
                .ok_or_else(|| AppError::unauthorized("Authentication required"))
        }
    }

    impl<S> FromRequestParts<S> for OptionalCaller
    where
        S: Send + Sync,
    {
        type Rejection = std::convert::Infallible;

        async fn from_request_parts(
            parts: &mut Parts,
            _state: &S,
        ) -> Result<Self, Self::Rejection> {
            Ok(OptionalCaller(parts.extensions.get::<CurrentUser>().copied()))
        }
    }
}
