use std::collections::BTreeSet;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft};
use crate::domain::query::{PostQuery, like_pattern};
use crate::domain::tag::Tag;
use crate::domain::user::Author;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    /// Replaces title, content and tags. Author and publish date are left alone.
    async fn update_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, DomainError>;
    /// Removes the post and every comment on it. `false` when nothing matched.
    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError>;
    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_created(&self, id: Uuid) -> Result<Post, DomainError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("post {} vanished after write", id)))
    }
}

const SELECT_POSTS: &str = r#"
    SELECT p.id, p.author_id, u.username AS author_username, p.title, p.content,
           p.published_date,
           COALESCE(
               array_agg(t.name ORDER BY t.name) FILTER (WHERE t.id IS NOT NULL),
               '{}'::text[]
           ) AS tags
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_tags pt ON pt.post_id = p.id
    LEFT JOIN tags t ON t.id = pt.tag_id
"#;

const GROUP_NEWEST_FIRST: &str = "GROUP BY p.id, u.id ORDER BY p.published_date DESC";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    author_username: String,
    title: String,
    content: String,
    published_date: DateTime<Utc>,
    tags: Vec<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            author: Author {
                id: row.author_id,
                username: row.author_username,
            },
            title: row.title,
            content: row.content,
            published_date: row.published_date,
            tags: row.tags.into_iter().collect(),
        }
    }
}

/// Points the post at exactly the given labels, creating missing tags.
/// A label whose slug is already known attaches the existing tag.
async fn replace_tags(
    conn: &mut PgConnection,
    post_id: Uuid,
    labels: &BTreeSet<String>,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    if labels.is_empty() {
        return Ok(());
    }

    let tags: Vec<Tag> = labels.iter().cloned().map(Tag::new).collect();
    let ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
    let names: Vec<String> = tags.iter().map(|t| t.name.clone()).collect();
    let slugs: Vec<String> = tags.iter().map(|t| t.slug.clone()).collect();

    sqlx::query(
        r#"
        INSERT INTO tags (id, name, slug)
        SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::text[])
        ON CONFLICT (slug) DO NOTHING
        "#,
    )
    .bind(ids)
    .bind(names)
    .bind(slugs.clone())
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO post_tags (post_id, tag_id)
        SELECT $1, id FROM tags WHERE slug = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(slugs)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, title, content, published_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(post.id)
        .bind(post.author.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.published_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::from(e)
        })?;

        replace_tags(&mut *tx, post.id, &post.tags).await.map_err(|e| {
            error!("failed to tag post {}: {}", post.id, e);
            DomainError::from(e)
        })?;

        tx.commit().await?;

        info!(post_id = %post.id, author_id = %post.author.id, "post created");
        self.fetch_created(post.id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let sql = format!("{SELECT_POSTS} WHERE p.id = $1 {GROUP_NEWEST_FIRST}");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::from(e)
            })?;
        Ok(row.map(Post::from))
    }

    async fn update_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, DomainError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE posts SET title = $1, content = $2 WHERE id = $3")
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("failed to update post {}: {}", id, e);
                DomainError::from(e)
            })?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        replace_tags(&mut *tx, id, &draft.tags).await.map_err(|e| {
            error!("failed to retag post {}: {}", id, e);
            DomainError::from(e)
        })?;

        tx.commit().await?;

        info!(post_id = %id, "post updated");
        self.find_by_id(id).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete post {}: {}", id, e);
                DomainError::from(e)
            })?;

        if deleted.rows_affected() > 0 {
            info!(post_id = %id, "post deleted");
        }
        Ok(deleted.rows_affected() > 0)
    }

    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError> {
        let rows = match query {
            PostQuery::All => {
                let sql = format!("{SELECT_POSTS} {GROUP_NEWEST_FIRST}");
                sqlx::query_as::<_, PostRow>(&sql)
                    .fetch_all(&self.pool)
                    .await
            }
            PostQuery::Tagged(tag) => {
                let sql = format!(
                    "{SELECT_POSTS} WHERE EXISTS (
                        SELECT 1 FROM post_tags f WHERE f.post_id = p.id AND f.tag_id = $1
                    ) {GROUP_NEWEST_FIRST}"
                );
                sqlx::query_as::<_, PostRow>(&sql)
                    .bind(tag.id)
                    .fetch_all(&self.pool)
                    .await
            }
            PostQuery::Search(q) => {
                let sql = format!(
                    "{SELECT_POSTS} WHERE p.title ILIKE $1 OR p.content ILIKE $1 {GROUP_NEWEST_FIRST}"
                );
                sqlx::query_as::<_, PostRow>(&sql)
                    .bind(like_pattern(q))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| {
            error!("db error while querying posts {:?}: {}", query, e);
            DomainError::from(e)
        })?;

        Ok(rows.into_iter().map(Post::from).collect())
    }
}
