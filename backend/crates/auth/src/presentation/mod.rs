//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{
    ADMIN_ROLES, AuthGuard, RateLimitState, SUPER_ADMIN_ROLES, optional_auth, rate_limit,
    require_auth, require_role,
};
pub use router::{identity_router, identity_router_generic};
