//! Access Token Authentication
//!
//! Turns a bearer token into the caller identity attached to a request.

use kernel::CurrentUser;
use platform::token::{TokenError, TokenService};

use crate::error::{AuthError, AuthResult};

/// Validate an access token. Every failure kind is logged but collapses to
/// `Unauthorized` for the client.
pub fn authenticate(tokens: &TokenService, access_token: &str) -> AuthResult<CurrentUser> {
    let claims = tokens.validate_access(access_token).map_err(|e| {
        match e {
            TokenError::WrongAlgorithm | TokenError::BadSignature => {
                tracing::warn!(reason = %e, "Access token rejected");
            }
            _ => tracing::debug!(reason = %e, "Access token rejected"),
        }
        AuthError::Unauthorized
    })?;

    // validate_access guarantees a role on access tokens
    let role = claims.role.ok_or(AuthError::Unauthorized)?;
    Ok(CurrentUser::new(claims.user_id, role))
}
