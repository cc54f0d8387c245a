//! Article Lifecycle Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, content policy,
//!   content-generation port
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL store and the content-generation HTTP client
//! - `presentation/` - HTTP handlers, DTOs, routes
//!
//! ## Lifecycle
//! Articles are drafted, published, archived and soft-deleted into the
//! author's trash, from where they can be restored or removed for good.
//! Publishing requires every tag on the article to be approved.
//!
//! ## Access
//! Mutations are open to the author and to admins. Anyone else gets
//! `NOT_FOUND`, whether or not the article exists.
//!
//! ## Engagement
//! Views are counted once per viewer per article inside a 24 h window.
//! Claps accumulate per reader up to a fixed ceiling. Both counters move
//! through atomic increments only.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{ArticleConfig, EngagementUseCase};
pub use error::{ArticleError, ArticleResult};
pub use infra::{AiBackend, HttpAiClient, PgArticleRepository};
pub use presentation::{ArticleRoutes, article_routes, article_routes_generic};
