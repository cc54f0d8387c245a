//! Shared Kernel - Domain-crossing minimal core
//!
//! The vocabulary every bounded context agrees on:
//! - Unified error type with the HTTP status / code mapping
//! - Typed identifiers
//! - Caller identity (`CurrentUser`) and roles
//! - Pagination primitives
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod caller;
pub mod id;
pub mod page;
pub mod role;

pub use caller::{CurrentUser, OptionalCaller};
pub use error::app_error::{AppError, AppResult};
pub use error::kind::ErrorKind;
pub use id::Id;
pub use page::{Page, PageRequest};
pub use role::UserRole;
