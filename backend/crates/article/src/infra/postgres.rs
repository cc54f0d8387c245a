//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::PageRequest;
use kernel::id::{ArticleId, TagId, UserId};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::domain::entity::{
    Article, ArticleStats, ArticleStatus, ClapOutcome, Tag, TagStatus, View,
};
use crate::domain::repository::{
    ArticleListing, ArticleRepository, ArticleSort, EngagementRepository, TagRepository,
};
use crate::domain::value_object::{ContentBlock, Slug, TagName};
use crate::error::{ArticleError, ArticleResult};

const ARTICLES_SLUG_KEY: &str = "articles_slug_key";
const TAGS_TAG_NAME_KEY: &str = "tags_tag_name_key";

const PUBLISHED: i16 = ArticleStatus::Published.id();
const DELETED: i16 = ArticleStatus::Deleted.id();

/// PostgreSQL-backed article store (articles, tags, views, claps)
#[derive(Clone)]
pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate unique violations into domain errors.
fn map_write_error(err: sqlx::Error) -> ArticleError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        match db.constraint() {
            Some(ARTICLES_SLUG_KEY) => return ArticleError::DuplicateArticleSlug,
            Some(TAGS_TAG_NAME_KEY) => return ArticleError::TagAlreadyExists,
            _ => {}
        }
    }
    ArticleError::Database(err)
}

async fn bump_view_count<'e, E>(executor: E, article_id: ArticleId) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let updated =
        sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE article_id = $1")
            .bind(article_id.as_uuid())
            .execute(executor)
            .await?
            .rows_affected();
    Ok(updated)
}

async fn bump_clap_count<'e, E>(
    executor: E,
    article_id: ArticleId,
    delta: i64,
) -> Result<Option<i64>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        "UPDATE articles SET clap_count = clap_count + $2 WHERE article_id = $1 \
         RETURNING clap_count",
    )
    .bind(article_id.as_uuid())
    .bind(delta)
    .fetch_optional(executor)
    .await
}

/// Views and claps of removed articles go in the caller's transaction.
async fn delete_engagement(
    tx: &mut Transaction<'_, Postgres>,
    article_ids: &[Uuid],
) -> Result<u64, sqlx::Error> {
    let views = sqlx::query("DELETE FROM article_views WHERE article_id = ANY($1)")
        .bind(article_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    let claps = sqlx::query("DELETE FROM article_claps WHERE article_id = ANY($1)")
        .bind(article_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    Ok(views + claps)
}

fn tag_strings(tags: &[TagName]) -> Vec<String> {
    tags.iter().map(|t| t.as_str().to_string()).collect()
}

const ARTICLE_COLUMNS: &str = r#"
    article_id,
    author_id,
    slug,
    title,
    excerpt,
    language,
    cover_image,
    content,
    tags,
    status,
    view_count,
    clap_count,
    created_at,
    updated_at,
    published_at,
    archived_at,
    deleted_at,
    version
"#;

/// WHERE clause of a listing.
fn push_listing_filter(qb: &mut QueryBuilder<'static, Postgres>, listing: &ArticleListing) {
    qb.push(" WHERE ");
    match listing {
        ArticleListing::ByAuthor { author_id } => {
            qb.push("author_id = ")
                .push_bind(author_id.into_uuid())
                .push(" AND status <> ")
                .push_bind(DELETED);
        }
        ArticleListing::Trash { author_id } => {
            qb.push("author_id = ")
                .push_bind(author_id.into_uuid())
                .push(" AND status = ")
                .push_bind(DELETED);
        }
        ArticleListing::ByTags(tags) => {
            qb.push("status = ")
                .push_bind(PUBLISHED)
                .push(" AND tags && ")
                .push_bind(tag_strings(tags));
        }
        ArticleListing::Search {
            query,
            include_unpublished,
        } => {
            qb.push("search_vector @@ websearch_to_tsquery('simple', ")
                .push_bind(query.clone())
                .push(")");
            if *include_unpublished {
                qb.push(" AND status <> ").push_bind(DELETED);
            } else {
                qb.push(" AND status = ").push_bind(PUBLISHED);
            }
        }
        ArticleListing::Filter(filter) => {
            qb.push("status = ").push_bind(PUBLISHED);
            if let Some(author_id) = filter.author_id {
                qb.push(" AND author_id = ").push_bind(author_id.into_uuid());
            }
            if !filter.tags.is_empty() {
                qb.push(" AND tags @> ").push_bind(tag_strings(&filter.tags));
            }
            if let Some(language) = &filter.language {
                qb.push(" AND language = ").push_bind(language.clone());
            }
            if let Some(after) = filter.published_after {
                qb.push(" AND published_at >= ").push_bind(after);
            }
            if let Some(before) = filter.published_before {
                qb.push(" AND published_at <= ").push_bind(before);
            }
        }
        ArticleListing::Trending { since } => {
            qb.push("status = ")
                .push_bind(PUBLISHED)
                .push(" AND published_at >= ")
                .push_bind(*since);
        }
        ArticleListing::Newest | ArticleListing::Popular => {
            qb.push("status = ").push_bind(PUBLISHED);
        }
        ArticleListing::All { status } => match status {
            Some(status) => {
                qb.push("status = ").push_bind(status.id());
            }
            None => {
                qb.push("TRUE");
            }
        },
    }
}

fn push_listing_order(qb: &mut QueryBuilder<'static, Postgres>, listing: &ArticleListing) {
    match listing {
        ArticleListing::ByAuthor { .. } | ArticleListing::All { .. } => {
            qb.push(" ORDER BY created_at DESC, article_id");
        }
        ArticleListing::Trash { .. } => {
            qb.push(" ORDER BY deleted_at DESC NULLS LAST, article_id");
        }
        ArticleListing::ByTags(_) | ArticleListing::Newest => {
            qb.push(" ORDER BY published_at DESC, article_id");
        }
        ArticleListing::Search { query, .. } => {
            qb.push(" ORDER BY (status = ")
                .push_bind(PUBLISHED)
                .push(") DESC, ts_rank(search_vector, websearch_to_tsquery('simple', ")
                .push_bind(query.clone())
                .push(")) DESC, created_at DESC, article_id");
        }
        ArticleListing::Filter(filter) => {
            qb.push(match filter.sort {
                ArticleSort::Newest => " ORDER BY published_at DESC, article_id",
                ArticleSort::Oldest => " ORDER BY published_at ASC, article_id",
                ArticleSort::MostViewed => {
                    " ORDER BY view_count DESC, published_at DESC, article_id"
                }
                ArticleSort::MostClapped => {
                    " ORDER BY clap_count DESC, published_at DESC, article_id"
                }
            });
        }
        ArticleListing::Trending { .. } => {
            qb.push(" ORDER BY view_count DESC, published_at DESC, article_id");
        }
        ArticleListing::Popular => {
            qb.push(" ORDER BY clap_count DESC, view_count DESC, published_at DESC, article_id");
        }
    }
}

// ============================================================================
// Article Repository Implementation
// ============================================================================

impl ArticleRepository for PgArticleRepository {
    async fn insert(&self, article: &Article) -> ArticleResult<()> {
        sqlx::query(
            r#"
            INSERT INTO articles (
                article_id,
                author_id,
                slug,
                title,
                excerpt,
                language,
                cover_image,
                content,
                tags,
                status,
                view_count,
                clap_count,
                created_at,
                updated_at,
                published_at,
                archived_at,
                deleted_at,
                version
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9,
                $10, $11, $12, $13, $14, $15, $16, $17, $18
            )
            "#,
        )
        .bind(article.article_id.as_uuid())
        .bind(article.author_id.as_uuid())
        .bind(article.slug.as_str())
        .bind(&article.title)
        .bind(&article.excerpt)
        .bind(&article.language)
        .bind(&article.cover_image)
        .bind(Json(&article.content))
        .bind(tag_strings(&article.tags))
        .bind(article.status.id())
        .bind(article.stats.view_count)
        .bind(article.stats.clap_count)
        .bind(article.created_at)
        .bind(article.updated_at)
        .bind(article.published_at)
        .bind(article.archived_at)
        .bind(article.deleted_at)
        .bind(article.version)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn update(&self, article: &Article, expected_version: i64) -> ArticleResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE articles SET
                slug = $2,
                title = $3,
                excerpt = $4,
                language = $5,
                cover_image = $6,
                content = $7,
                tags = $8,
                status = $9,
                archived_at = $10,
                updated_at = $11,
                version = version + 1
            WHERE article_id = $1 AND version = $12
            "#,
        )
        .bind(article.article_id.as_uuid())
        .bind(article.slug.as_str())
        .bind(&article.title)
        .bind(&article.excerpt)
        .bind(&article.language)
        .bind(&article.cover_image)
        .bind(Json(&article.content))
        .bind(tag_strings(&article.tags))
        .bind(article.status.id())
        .bind(article.archived_at)
        .bind(article.updated_at)
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?
        .rows_affected();

        if updated == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM articles WHERE article_id = $1)",
            )
            .bind(article.article_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

            return Err(if exists {
                ArticleError::Conflict
            } else {
                ArticleError::NotFound
            });
        }
        Ok(())
    }

    async fn transition(&self, article: &Article, previous: ArticleStatus) -> ArticleResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE articles SET
                status = $2,
                published_at = $3,
                archived_at = $4,
                deleted_at = $5,
                updated_at = $6,
                version = version + 1
            WHERE article_id = $1 AND status = $7
            "#,
        )
        .bind(article.article_id.as_uuid())
        .bind(article.status.id())
        .bind(article.published_at)
        .bind(article.archived_at)
        .bind(article.deleted_at)
        .bind(article.updated_at)
        .bind(previous.id())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn find_by_id(&self, article_id: ArticleId) -> ArticleResult<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE article_id = $1"
        ))
        .bind(article_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ArticleRow::into_article).transpose()
    }

    async fn find_by_slug(&self, slug: &Slug) -> ArticleResult<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ArticleRow::into_article).transpose()
    }

    async fn slug_exists(&self, slug: &Slug) -> ArticleResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM articles WHERE slug = $1)")
                .bind(slug.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn count_by_author(&self, author_id: UserId) -> ArticleResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM articles WHERE author_id = $1 AND status <> $2",
        )
        .bind(author_id.as_uuid())
        .bind(DELETED)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn list(
        &self,
        listing: &ArticleListing,
        page: PageRequest,
    ) -> ArticleResult<(Vec<Article>, u64)> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM articles");
        push_listing_filter(&mut count_query, listing);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut items_query = QueryBuilder::new(format!("SELECT {ARTICLE_COLUMNS} FROM articles"));
        push_listing_filter(&mut items_query, listing);
        push_listing_order(&mut items_query, listing);
        items_query
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = items_query
            .build_query_as::<ArticleRow>()
            .fetch_all(&self.pool)
            .await?;

        let articles = rows
            .into_iter()
            .map(ArticleRow::into_article)
            .collect::<ArticleResult<Vec<_>>>()?;

        Ok((articles, total.max(0) as u64))
    }

    async fn hard_delete(&self, article_id: ArticleId) -> ArticleResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM articles WHERE article_id = $1")
            .bind(article_id.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Ok(false);
        }
        delete_engagement(&mut tx, &[article_id.into_uuid()]).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn empty_trash(&self, author_id: UserId) -> ArticleResult<Vec<ArticleId>> {
        let mut tx = self.pool.begin().await?;

        let ids = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM articles WHERE author_id = $1 AND status = $2 RETURNING article_id",
        )
        .bind(author_id.as_uuid())
        .bind(DELETED)
        .fetch_all(&mut *tx)
        .await?;
        if !ids.is_empty() {
            delete_engagement(&mut tx, &ids).await?;
        }

        tx.commit().await?;
        Ok(ids.into_iter().map(ArticleId::from_uuid).collect())
    }

    async fn delete_from_trash(
        &self,
        article_id: ArticleId,
        author_id: UserId,
    ) -> ArticleResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM articles WHERE article_id = $1 AND author_id = $2 AND status = $3",
        )
        .bind(article_id.as_uuid())
        .bind(author_id.as_uuid())
        .bind(DELETED)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if deleted == 0 {
            return Ok(false);
        }
        delete_engagement(&mut tx, &[article_id.into_uuid()]).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn increment_view(&self, article_id: ArticleId) -> ArticleResult<bool> {
        Ok(bump_view_count(&self.pool, article_id).await? > 0)
    }

    async fn update_clap_count(
        &self,
        article_id: ArticleId,
        delta: i64,
    ) -> ArticleResult<Option<i64>> {
        Ok(bump_clap_count(&self.pool, article_id, delta).await?)
    }

    async fn reset_stats(&self, article_id: ArticleId, clap_count: i64) -> ArticleResult<bool> {
        let updated = sqlx::query(
            "UPDATE articles SET view_count = 0, clap_count = $2 WHERE article_id = $1",
        )
        .bind(article_id.as_uuid())
        .bind(clap_count)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }
}

// ============================================================================
// Tag Repository Implementation
// ============================================================================

const TAG_COLUMNS: &str = "tag_id, tag_name, status, created_by, created_at, updated_at";

impl TagRepository for PgArticleRepository {
    async fn create(&self, tag: &Tag) -> ArticleResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tags (tag_id, tag_name, status, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tag.tag_id.as_uuid())
        .bind(tag.name.as_str())
        .bind(tag.status.id())
        .bind(tag.created_by.as_uuid())
        .bind(tag.created_at)
        .bind(tag.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, tag_id: TagId) -> ArticleResult<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE tag_id = $1"
        ))
        .bind(tag_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TagRow::into_tag).transpose()
    }

    async fn find_by_names(&self, names: &[TagName]) -> ArticleResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE tag_name = ANY($1)"
        ))
        .bind(tag_strings(names))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TagRow::into_tag).collect()
    }

    async fn set_status(&self, tag_id: TagId, status: TagStatus) -> ArticleResult<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            "UPDATE tags SET status = $2, updated_at = now() \
             WHERE tag_id = $1 RETURNING {TAG_COLUMNS}"
        ))
        .bind(tag_id.as_uuid())
        .bind(status.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TagRow::into_tag).transpose()
    }

    async fn delete(&self, tag_id: TagId) -> ArticleResult<bool> {
        let deleted = sqlx::query("DELETE FROM tags WHERE tag_id = $1")
            .bind(tag_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list(
        &self,
        status: Option<TagStatus>,
        page: PageRequest,
    ) -> ArticleResult<(Vec<Tag>, u64)> {
        let status = status.map(|s| s.id());

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tags WHERE ($1::SMALLINT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, TagRow>(&format!(
            r#"
            SELECT {TAG_COLUMNS} FROM tags
            WHERE ($1::SMALLINT IS NULL OR status = $1)
            ORDER BY tag_name
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let tags = rows
            .into_iter()
            .map(TagRow::into_tag)
            .collect::<ArticleResult<Vec<_>>>()?;

        Ok((tags, total.max(0) as u64))
    }
}

// ============================================================================
// Engagement Repository Implementation
// ============================================================================

impl EngagementRepository for PgArticleRepository {
    async fn record_view(&self, view: &View, window_start: DateTime<Utc>) -> ArticleResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent views from the same viewer on the same article.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", view.article_id, view.viewer_key))
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO article_views (view_id, article_id, user_id, ip, viewer_key, created_at)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (
                SELECT 1 FROM article_views
                WHERE article_id = $2 AND viewer_key = $5 AND created_at > $7
            )
            "#,
        )
        .bind(view.view_id)
        .bind(view.article_id.as_uuid())
        .bind(view.user_id.map(UserId::into_uuid))
        .bind(&view.ip)
        .bind(&view.viewer_key)
        .bind(view.created_at)
        .bind(window_start)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if inserted == 0 {
            return Ok(false);
        }
        bump_view_count(&mut *tx, view.article_id).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn add_clap(
        &self,
        user_id: UserId,
        article_id: ArticleId,
        max_claps: i32,
    ) -> ArticleResult<Option<ClapOutcome>> {
        let mut tx = self.pool.begin().await?;

        let user_claps = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO article_claps (user_id, article_id, count, created_at, updated_at)
            VALUES ($1, $2, 1, now(), now())
            ON CONFLICT (user_id, article_id) DO UPDATE
                SET count = article_claps.count + 1, updated_at = now()
                WHERE article_claps.count < $3
            RETURNING count
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(article_id.as_uuid())
        .bind(max_claps)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(user_claps) = user_claps else {
            return Ok(None);
        };

        let clap_count = bump_clap_count(&mut *tx, article_id, 1)
            .await?
            .ok_or(ArticleError::NotFound)?;

        tx.commit().await?;
        Ok(Some(ClapOutcome {
            user_claps,
            clap_count,
        }))
    }

    async fn user_claps(&self, user_id: UserId, article_id: ArticleId) -> ArticleResult<i32> {
        let count = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(\
                (SELECT count FROM article_claps WHERE user_id = $1 AND article_id = $2), 0)",
        )
        .bind(user_id.as_uuid())
        .bind(article_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn total_claps(&self, article_id: ArticleId) -> ArticleResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(count), 0)::BIGINT FROM article_claps WHERE article_id = $1",
        )
        .bind(article_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn purge_views_before(&self, cutoff: DateTime<Utc>) -> ArticleResult<u64> {
        let purged = sqlx::query("DELETE FROM article_views WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(purged)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ArticleRow {
    article_id: Uuid,
    author_id: Uuid,
    slug: String,
    title: String,
    excerpt: String,
    language: String,
    cover_image: Option<String>,
    content: Json<Vec<ContentBlock>>,
    tags: Vec<String>,
    status: i16,
    view_count: i64,
    clap_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    archived_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    version: i64,
}

impl ArticleRow {
    fn into_article(self) -> ArticleResult<Article> {
        let status = ArticleStatus::from_id(self.status).ok_or_else(|| {
            ArticleError::Internal(format!("Invalid article status: {}", self.status))
        })?;

        Ok(Article {
            article_id: ArticleId::from_uuid(self.article_id),
            author_id: UserId::from_uuid(self.author_id),
            slug: Slug::from_db(self.slug),
            title: self.title,
            excerpt: self.excerpt,
            language: self.language,
            cover_image: self.cover_image,
            content: self.content.0,
            tags: self.tags.into_iter().map(TagName::from_db).collect(),
            status,
            stats: ArticleStats {
                view_count: self.view_count,
                clap_count: self.clap_count,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
            published_at: self.published_at,
            archived_at: self.archived_at,
            deleted_at: self.deleted_at,
            version: self.version,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    tag_id: Uuid,
    tag_name: String,
    status: i16,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TagRow {
    fn into_tag(self) -> ArticleResult<Tag> {
        let status = TagStatus::from_id(self.status)
            .ok_or_else(|| ArticleError::Internal(format!("Invalid tag status: {}", self.status)))?;

        Ok(Tag {
            tag_id: TagId::from_uuid(self.tag_id),
            name: TagName::from_db(self.tag_name),
            status,
            created_by: UserId::from_uuid(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
