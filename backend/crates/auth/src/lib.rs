//! Identity & Session Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, mailer port
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations and mail transport
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration with email verification (single-use mailed codes)
//! - Login by email or user name; short-lived access tokens plus rotating
//!   refresh tokens persisted as digests
//! - Password change / reset, email change confirmed from the new address
//! - Profile, bookmarks and admin user management
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional application pepper
//! - Refresh rotation is a compare-and-swap on the old row; a replayed token
//!   is reported as revoked
//! - Every password change revokes all refresh tokens of the user
//! - Forgot-password and resend-verification never reveal whether an address
//!   is registered

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::{IdentityMaintenanceUseCase, MaintenanceReport};
pub use error::{AuthError, AuthResult};
pub use infra::{LogMailer, PgIdentityRepository};
pub use presentation::middleware::{
    ADMIN_ROLES, AuthGuard, SUPER_ADMIN_ROLES, optional_auth, require_auth, require_role,
};
pub use presentation::router::{identity_router, identity_router_generic};
