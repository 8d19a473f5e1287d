use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use crate::domain::error::DomainError;
use crate::domain::tag::Tag;

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Every known tag, ordered by name.
    async fn all_tags(&self) -> Result<Vec<Tag>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: uuid::Uuid,
    name: String,
    slug: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn all_tags(&self) -> Result<Vec<Tag>, DomainError> {
        let rows = sqlx::query_as::<_, TagRow>("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while fetching tags: {}", e);
                DomainError::from(e)
            })?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        let row =
            sqlx::query_as::<_, TagRow>("SELECT id, name, slug FROM tags WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    error!("db error find_by_slug {}: {}", slug, e);
                    DomainError::from(e)
                })?;
        Ok(row.map(Tag::from))
    }
}
