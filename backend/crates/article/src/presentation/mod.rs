//! Presentation Layer
//!
//! HTTP handlers, DTOs and the article routes.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ArticleAppState;
pub use router::{ArticleRoutes, article_routes, article_routes_generic};
