//! Domain Layer
//!
//! Contains entities, value objects, repository traits, the content policy
//! and the content-generation port.

pub mod ai;
pub mod entity;
pub mod policy;
pub mod repository;
pub mod value_object;

// Re-exports
pub use ai::{AiClient, AiError, DisabledAiClient};
pub use entity::{
    Article, ArticleStats, ArticleStatus, Clap, ClapOutcome, NewArticle, Tag, TagStatus,
    Transition, View, ViewerKey,
};
pub use policy::{ContentPolicy, PolicyViolation};
pub use repository::{
    ArticleFilter, ArticleListing, ArticleRepository, ArticleSort, ArticleStore,
    EngagementRepository, TagRepository,
};
pub use value_object::{BlockBody, ContentBlock, ContentError, Slug, TagName, validate_content};
