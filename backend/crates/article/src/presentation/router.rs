//! Article Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::application::config::ArticleConfig;
use crate::domain::ai::AiClient;
use crate::domain::repository::ArticleStore;
use crate::infra::{AiBackend, PgArticleRepository};
use crate::presentation::handlers::{self, ArticleAppState};

/// Article routes grouped by the authentication they need. The caller's
/// identity comes from middleware applied by the binary:
///
/// - `public`: optional caller (anonymous readers allowed)
/// - `protected`: authenticated caller required
/// - `admin`: authenticated caller with an admin role
pub struct ArticleRoutes {
    pub public: Router,
    pub protected: Router,
    pub admin: Router,
}

/// Create the article routes with the PostgreSQL store
pub fn article_routes(
    repo: PgArticleRepository,
    ai: AiBackend,
    config: ArticleConfig,
) -> ArticleRoutes {
    article_routes_generic(Arc::new(repo), Arc::new(ai), Arc::new(config))
}

/// Create the article routes for any store / content generator
pub fn article_routes_generic<S, C>(
    store: Arc<S>,
    ai: Arc<C>,
    config: Arc<ArticleConfig>,
) -> ArticleRoutes
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let state = ArticleAppState { store, ai, config };

    let public = Router::new()
        .route("/articles/{id}", get(handlers::get_article::<S, C>))
        .route("/articles/{id}/stats", get(handlers::article_stats::<S, C>))
        .route("/articles/{id}/view", post(handlers::record_view::<S, C>))
        .route("/articles/trending", get(handlers::trending::<S, C>))
        .route("/articles/new", get(handlers::newest::<S, C>))
        .route("/articles/popular", get(handlers::popular::<S, C>))
        .route("/articles/filter", post(handlers::filter_articles::<S, C>))
        .route("/p/{slug}", get(handlers::get_by_slug::<S, C>))
        .route("/search", get(handlers::search::<S, C>))
        .route("/article/tags", get(handlers::list_by_tags::<S, C>))
        .route("/tags", get(handlers::list_tags::<S, C>))
        .route("/tags/approved", get(handlers::tag_approval::<S, C>))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/articles", post(handlers::create_article::<S, C>))
        .route(
            "/articles/{id}",
            put(handlers::update_article::<S, C>).delete(handlers::delete_article::<S, C>),
        )
        .route("/articles/{id}/publish", post(handlers::publish_article::<S, C>))
        .route("/articles/{id}/unpublish", post(handlers::unpublish_article::<S, C>))
        .route("/articles/{id}/archive", post(handlers::archive_article::<S, C>))
        .route("/articles/{id}/unarchive", post(handlers::unarchive_article::<S, C>))
        .route("/articles/{id}/restore", post(handlers::restore_article::<S, C>))
        .route("/articles/{id}/clap", post(handlers::clap::<S, C>))
        .route("/articles/{id}/generate", post(handlers::generate_content::<S, C>))
        .route("/articles/trash/{id}", delete(handlers::delete_from_trash::<S, C>))
        .route("/me/articles", get(handlers::list_mine::<S, C>))
        .route(
            "/me/trash",
            get(handlers::list_trash::<S, C>).delete(handlers::empty_trash::<S, C>),
        )
        .route("/tags/new", post(handlers::create_tag::<S, C>))
        .with_state(state.clone());

    let admin = Router::new()
        .route("/admin/articles", get(handlers::admin_list_articles::<S, C>))
        .route("/admin/articles/{id}", delete(handlers::admin_hard_delete::<S, C>))
        .route(
            "/admin/articles/{id}/unpublish",
            post(handlers::admin_unpublish::<S, C>),
        )
        .route(
            "/admin/articles/{id}/reset-stats",
            post(handlers::admin_reset_stats::<S, C>),
        )
        .route("/tags/{id}/approve", patch(handlers::approve_tag::<S, C>))
        .route("/tags/{id}/reject", patch(handlers::reject_tag::<S, C>))
        .route("/tags/{id}", delete(handlers::delete_tag::<S, C>))
        .with_state(state);

    ArticleRoutes {
        public,
        protected,
        admin,
    }
}
