//! Domain Entities

pub mod article;
pub mod engagement;
pub mod tag;

pub use article::{
    Article, ArticleStats, ArticleStatus, NewArticle, Transition, normalize_excerpt,
    normalize_language, normalize_title,
};
pub use engagement::{Clap, ClapOutcome, View, ViewerKey};
pub use tag::{Tag, TagStatus};
