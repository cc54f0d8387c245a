//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::{ArticleId, TagId};
use kernel::{CurrentUser, OptionalCaller, Page, PageRequest};
use platform::client::ClientMetadata;

use crate::application::{
    ArticleConfig, ArticleQueryUseCase, CreateArticleUseCase, EngagementStats, EngagementUseCase,
    GenerateContentUseCase, LifecycleUseCase, TagUseCase, TrashUseCase, UpdateArticleUseCase,
};
use crate::domain::ai::AiClient;
use crate::domain::entity::{Article, ArticleStats, ArticleStatus, TagStatus};
use crate::domain::repository::ArticleStore;
use crate::error::{ArticleError, ArticleResult};
use crate::presentation::dto::{
    ArticleResponse, ClapResponse, CreateArticleRequest, CreateTagRequest, FilterRequest,
    GenerateRequest, SearchQuery, StatusQuery, TagApprovalResponse, TagNameQuery, TagResponse,
    TagsQuery, TrashEmptiedResponse, TrendingQuery, UpdateArticleRequest, ViewResponse,
};

/// Shared state for article handlers
pub struct ArticleAppState<S, C>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    pub store: Arc<S>,
    pub ai: Arc<C>,
    pub config: Arc<ArticleConfig>,
}

impl<S, C> Clone for ArticleAppState<S, C>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            ai: self.ai.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, C> ArticleAppState<S, C>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    fn lifecycle(&self) -> LifecycleUseCase<S, S> {
        LifecycleUseCase::new(self.store.clone(), self.store.clone())
    }

    fn queries(&self) -> ArticleQueryUseCase<S, S, S> {
        ArticleQueryUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.config.clone(),
        )
    }

    fn engagement(&self) -> EngagementUseCase<S, S> {
        EngagementUseCase::new(self.store.clone(), self.store.clone(), self.config.clone())
    }

    fn tags(&self) -> TagUseCase<S> {
        TagUseCase::new(self.store.clone())
    }
}

/// Malformed ids are a client error, not a missing article.
fn parse_article_id(raw: &str) -> ArticleResult<ArticleId> {
    ArticleId::parse_str(raw.trim()).ok_or(ArticleError::InvalidArticleId)
}

fn parse_tag_id(raw: &str) -> ArticleResult<TagId> {
    TagId::parse_str(raw.trim()).ok_or_else(|| ArticleError::InvalidInput("Invalid tag id".into()))
}

fn page_response(page: Page<Article>) -> Json<Page<ArticleResponse>> {
    Json(page.map(ArticleResponse::from))
}

// ============================================================================
// Authoring
// ============================================================================

/// POST /articles
pub async fn create_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Json(req): Json<CreateArticleRequest>,
) -> ArticleResult<impl IntoResponse>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let use_case = CreateArticleUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.ai.clone(),
        state.config.clone(),
    );
    let article = use_case.execute(&caller, req.into()).await?;

    Ok((StatusCode::CREATED, Json(ArticleResponse::from(article))))
}

/// PUT /articles/{id}
pub async fn update_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
    Json(req): Json<UpdateArticleRequest>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let use_case = UpdateArticleUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.ai.clone(),
        state.config.clone(),
    );
    let article = use_case.execute(&caller, article_id, req.into()).await?;

    Ok(Json(article.into()))
}

/// POST /articles/{id}/generate
pub async fn generate_content<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
    Json(req): Json<GenerateRequest>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let use_case = GenerateContentUseCase::new(
        state.store.clone(),
        state.ai.clone(),
        state.config.clone(),
    );
    let article = use_case.execute(&caller, article_id, &req.instructions).await?;

    Ok(Json(article.into()))
}

// ============================================================================
// Lifecycle
// ============================================================================

/// POST /articles/{id}/publish
pub async fn publish_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let article = state.lifecycle().publish(&caller, article_id).await?;
    Ok(Json(article.into()))
}

/// POST /articles/{id}/unpublish
pub async fn unpublish_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let article = state.lifecycle().unpublish(&caller, article_id).await?;
    Ok(Json(article.into()))
}

/// POST /articles/{id}/archive
pub async fn archive_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let article = state.lifecycle().archive(&caller, article_id).await?;
    Ok(Json(article.into()))
}

/// POST /articles/{id}/unarchive
pub async fn unarchive_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let article = state.lifecycle().unarchive(&caller, article_id).await?;
    Ok(Json(article.into()))
}

/// DELETE /articles/{id}
pub async fn delete_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let article = state.lifecycle().delete(&caller, article_id).await?;
    Ok(Json(article.into()))
}

/// POST /articles/{id}/restore
pub async fn restore_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let article = state.lifecycle().restore(&caller, article_id).await?;
    Ok(Json(article.into()))
}

// ============================================================================
// Trash
// ============================================================================

/// GET /me/trash
pub async fn list_trash<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().trash(&caller, page).await?;
    Ok(page_response(page))
}

/// DELETE /me/trash
pub async fn empty_trash<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
) -> ArticleResult<Json<TrashEmptiedResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let removed = TrashUseCase::new(state.store.clone()).empty(&caller).await?;
    Ok(Json(TrashEmptiedResponse { removed }))
}

/// DELETE /articles/trash/{id}
pub async fn delete_from_trash<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<StatusCode>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    TrashUseCase::new(state.store.clone())
        .delete_one(&caller, article_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reading
// ============================================================================

/// GET /articles/{id}
pub async fn get_article<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    OptionalCaller(caller): OptionalCaller,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let article = state.queries().get_by_id(caller.as_ref(), article_id).await?;
    Ok(Json(article.into()))
}

/// GET /p/{slug}
pub async fn get_by_slug<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    OptionalCaller(caller): OptionalCaller,
    client: ClientMetadata,
    Path(slug): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article = state
        .queries()
        .get_by_slug(&slug, caller.map(|c| c.user_id), client.ip_string())
        .await?;
    Ok(Json(article.into()))
}

/// GET /me/articles
pub async fn list_mine<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().list_mine(&caller, page).await?;
    Ok(page_response(page))
}

/// GET /article/tags?tags=
pub async fn list_by_tags<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Query(query): Query<TagsQuery>,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().list_by_tags(&query.names(), page).await?;
    Ok(page_response(page))
}

/// GET /search?q=
pub async fn search<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    OptionalCaller(caller): OptionalCaller,
    Query(query): Query<SearchQuery>,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().search(caller.as_ref(), &query.q, page).await?;
    Ok(page_response(page))
}

/// POST /articles/filter
pub async fn filter_articles<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Query(page): Query<PageRequest>,
    Json(req): Json<FilterRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().filter(req.into(), page).await?;
    Ok(page_response(page))
}

/// GET /articles/trending?days=
pub async fn trending<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Query(query): Query<TrendingQuery>,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().trending(query.days, page).await?;
    Ok(page_response(page))
}

/// GET /articles/new
pub async fn newest<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().newest(page).await?;
    Ok(page_response(page))
}

/// GET /articles/popular
pub async fn popular<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().popular(page).await?;
    Ok(page_response(page))
}

// ============================================================================
// Engagement
// ============================================================================

/// POST /articles/{id}/view
pub async fn record_view<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    OptionalCaller(caller): OptionalCaller,
    client: ClientMetadata,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ViewResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let counted = state
        .engagement()
        .view(article_id, caller.map(|c| c.user_id), client.ip_string())
        .await?;
    Ok(Json(ViewResponse { counted }))
}

/// POST /articles/{id}/clap
pub async fn clap<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ClapResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let outcome = state.engagement().clap(&caller, article_id).await?;
    Ok(Json(outcome.into()))
}

/// GET /articles/{id}/stats
pub async fn article_stats<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    OptionalCaller(caller): OptionalCaller,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<EngagementStats>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let stats = state.engagement().stats(caller.as_ref(), article_id).await?;
    Ok(Json(stats))
}

// ============================================================================
// Tags
// ============================================================================

/// POST /tags/new
pub async fn create_tag<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Json(req): Json<CreateTagRequest>,
) -> ArticleResult<impl IntoResponse>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let tag = state.tags().create(caller.user_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

/// GET /tags?status=
pub async fn list_tags<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Query(query): Query<StatusQuery<TagStatus>>,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<TagResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.tags().list(query.status, page).await?;
    Ok(Json(page.map(TagResponse::from)))
}

/// GET /tags/approved?name=
pub async fn tag_approval<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Query(query): Query<TagNameQuery>,
) -> ArticleResult<Json<TagApprovalResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let approved = state.tags().is_approved(&query.name).await?;
    Ok(Json(TagApprovalResponse {
        name: query.name,
        approved,
    }))
}

/// PATCH /tags/{id}/approve
pub async fn approve_tag<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Path(tag_id): Path<String>,
) -> ArticleResult<Json<TagResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let tag = state.tags().approve(parse_tag_id(&tag_id)?).await?;
    Ok(Json(tag.into()))
}

/// PATCH /tags/{id}/reject
pub async fn reject_tag<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Path(tag_id): Path<String>,
) -> ArticleResult<Json<TagResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let tag = state.tags().reject(parse_tag_id(&tag_id)?).await?;
    Ok(Json(tag.into()))
}

/// DELETE /tags/{id}
pub async fn delete_tag<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    Path(tag_id): Path<String>,
) -> ArticleResult<StatusCode>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    state.tags().delete(parse_tag_id(&tag_id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin
// ============================================================================

/// GET /admin/articles?status=
pub async fn admin_list_articles<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Query(query): Query<StatusQuery<ArticleStatus>>,
    Query(page): Query<PageRequest>,
) -> ArticleResult<Json<Page<ArticleResponse>>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let page = state.queries().list_all(&caller, query.status, page).await?;
    Ok(page_response(page))
}

/// POST /admin/articles/{id}/unpublish
pub async fn admin_unpublish<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleResponse>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let article = state.lifecycle().admin_unpublish(&caller, article_id).await?;
    Ok(Json(article.into()))
}

/// DELETE /admin/articles/{id}
pub async fn admin_hard_delete<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<StatusCode>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    state.lifecycle().hard_delete(&caller, article_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/articles/{id}/reset-stats
pub async fn admin_reset_stats<S, C>(
    State(state): State<ArticleAppState<S, C>>,
    caller: CurrentUser,
    Path(article_id): Path<String>,
) -> ArticleResult<Json<ArticleStats>>
where
    S: ArticleStore,
    C: AiClient + Sync + 'static,
{
    let article_id = parse_article_id(&article_id)?;
    let stats = state.engagement().reset_stats(&caller, article_id).await?;
    Ok(Json(stats))
}
