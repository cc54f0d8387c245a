//! Article Error Types
//!
//! Article-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Article-specific result type alias
pub type ArticleResult<T> = Result<T, ArticleError>;

/// Article-specific error variants
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid article id")]
    InvalidArticleId,

    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// Missing, or not visible to the caller
    #[error("Article not found")]
    NotFound,

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Admin role required")]
    Forbidden,

    #[error("Article is already published")]
    AlreadyPublished,

    #[error("Article is not published")]
    NotPublished,

    #[error("Article is already archived")]
    AlreadyArchived,

    #[error("Article is not archived")]
    NotArchived,

    #[error("Article is already deleted")]
    AlreadyDeleted,

    #[error("Article is not deleted")]
    NotDeleted,

    #[error("No changes detected")]
    NoChangesDetected,

    /// Optimistic version or status check lost a race
    #[error("Article was modified concurrently")]
    Conflict,

    #[error("Article slug is already in use")]
    DuplicateArticleSlug,

    #[error("Tag already exists")]
    TagAlreadyExists,

    #[error("Tags are not approved: {}", .0.join(", "))]
    UnapprovedTags(Vec<String>),

    #[error("Tag has been rejected: {0}")]
    TagRejected(String),

    #[error("Content violates the content policy")]
    ContentPolicyViolation,

    #[error("Clap limit reached for this article")]
    ClapLimitExceeded,

    #[error("An article may carry at most {0} tags")]
    TagLimitExceeded(usize),

    #[error("Article limit of {0} per user reached")]
    MaxArticlesPerUser(u64),

    #[error("Content generation unavailable: {0}")]
    AiUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArticleError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArticleError::InvalidInput(_)
            | ArticleError::InvalidArticleId
            | ArticleError::InvalidTagName(_)
            | ArticleError::InvalidContent(_)
            | ArticleError::TagRejected(_)
            | ArticleError::TagLimitExceeded(_) => ErrorKind::BadRequest,
            ArticleError::NotFound | ArticleError::TagNotFound(_) => ErrorKind::NotFound,
            ArticleError::Forbidden => ErrorKind::Forbidden,
            ArticleError::AlreadyPublished
            | ArticleError::NotPublished
            | ArticleError::AlreadyArchived
            | ArticleError::NotArchived
            | ArticleError::AlreadyDeleted
            | ArticleError::NotDeleted
            | ArticleError::NoChangesDetected
            | ArticleError::Conflict
            | ArticleError::DuplicateArticleSlug
            | ArticleError::TagAlreadyExists
            | ArticleError::UnapprovedTags(_) => ErrorKind::Conflict,
            ArticleError::ContentPolicyViolation => ErrorKind::UnprocessableEntity,
            ArticleError::ClapLimitExceeded | ArticleError::MaxArticlesPerUser(_) => {
                ErrorKind::TooManyRequests
            }
            ArticleError::AiUnavailable(_) => ErrorKind::ServiceUnavailable,
            ArticleError::Database(_) | ArticleError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ArticleError::InvalidInput(_) => "INVALID_INPUT",
            ArticleError::InvalidArticleId => "INVALID_ARTICLE_ID",
            ArticleError::InvalidTagName(_) => "INVALID_TAG_NAME",
            ArticleError::InvalidContent(_) => "INVALID_CONTENT",
            ArticleError::NotFound => "NOT_FOUND",
            ArticleError::TagNotFound(_) => "TAG_NOT_FOUND",
            ArticleError::Forbidden => "FORBIDDEN",
            ArticleError::AlreadyPublished => "ALREADY_PUBLISHED",
            ArticleError::NotPublished => "NOT_PUBLISHED",
            ArticleError::AlreadyArchived => "ALREADY_ARCHIVED",
            ArticleError::NotArchived => "NOT_ARCHIVED",
            ArticleError::AlreadyDeleted => "ALREADY_DELETED",
            ArticleError::NotDeleted => "NOT_DELETED",
            ArticleError::NoChangesDetected => "NO_CHANGES_DETECTED",
            ArticleError::Conflict => "CONFLICT",
            ArticleError::DuplicateArticleSlug => "DUPLICATE_ARTICLE_SLUG",
            ArticleError::TagAlreadyExists => "TAG_ALREADY_EXISTS",
            ArticleError::UnapprovedTags(_) => "UNAPPROVED_TAGS",
            ArticleError::TagRejected(_) => "TAG_REJECTED",
            ArticleError::ContentPolicyViolation => "CONTENT_POLICY_VIOLATION",
            ArticleError::ClapLimitExceeded => "CLAP_LIMIT_EXCEEDED",
            ArticleError::TagLimitExceeded(_) => "TAG_LIMIT_EXCEEDED",
            ArticleError::MaxArticlesPerUser(_) => "MAX_ARTICLES_PER_USER",
            ArticleError::AiUnavailable(_) => "AI_UNAVAILABLE",
            ArticleError::Database(_) | ArticleError::Internal(_) => "INTERNAL",
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ArticleError::Database(e) => {
                tracing::error!(error = %e, "Article database error");
            }
            ArticleError::Internal(msg) => {
                tracing::error!(message = %msg, "Article internal error");
            }
            ArticleError::AiUnavailable(msg) => {
                tracing::warn!(message = %msg, "Content generation failed");
            }
            ArticleError::ContentPolicyViolation => {
                tracing::warn!("Content policy violation");
            }
            _ => {
                tracing::debug!(error = %self, "Article error");
            }
        }
    }
}

impl From<ArticleError> for AppError {
    fn from(err: ArticleError) -> Self {
        let code = err.code();
        let kind = err.kind();
        match err {
            ArticleError::Database(e) => AppError::new(kind, "Database error")
                .with_code(code)
                .with_source(e),
            other => AppError::new(kind, other.to_string()).with_code(code),
        }
    }
}

impl IntoResponse for ArticleError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<crate::domain::value_object::ContentError> for ArticleError {
    fn from(err: crate::domain::value_object::ContentError) -> Self {
        ArticleError::InvalidContent(err.to_string())
    }
}

impl From<crate::domain::value_object::TagNameError> for ArticleError {
    fn from(err: crate::domain::value_object::TagNameError) -> Self {
        ArticleError::InvalidTagName(err.to_string())
    }
}

impl From<crate::domain::value_object::SlugError> for ArticleError {
    fn from(err: crate::domain::value_object::SlugError) -> Self {
        ArticleError::InvalidInput(err.to_string())
    }
}

impl From<crate::domain::ai::AiError> for ArticleError {
    fn from(err: crate::domain::ai::AiError) -> Self {
        ArticleError::AiUnavailable(err.to_string())
    }
}
