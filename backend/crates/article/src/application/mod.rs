//! Application Layer
//!
//! Use cases over the article, tag and engagement repositories.

pub(crate) mod access;
pub mod config;
pub mod create;
pub mod engagement;
pub mod generate;
pub mod lifecycle;
pub mod query;
pub(crate) mod slug;
pub mod tags;
pub mod trash;
pub mod update;

// Re-exports
pub use config::ArticleConfig;
pub use create::{CreateArticleInput, CreateArticleUseCase};
pub use engagement::{EngagementStats, EngagementUseCase};
pub use generate::GenerateContentUseCase;
pub use lifecycle::LifecycleUseCase;
pub use query::{ArticleFilterInput, ArticleQueryUseCase};
pub use tags::TagUseCase;
pub use trash::TrashUseCase;
pub use update::{UpdateArticleInput, UpdateArticleUseCase};
