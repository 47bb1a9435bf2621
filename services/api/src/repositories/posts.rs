//! Post repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::post::Post;

const POST_COLUMNS: &str = "id, author_id, text, likes, liked_by, created_at";

fn post_from_row(row: &PgRow) -> ApiResult<Post> {
    Ok(Post {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        text: row.try_get("text")?,
        likes: row.try_get("likes")?,
        liked_by: row.try_get("liked_by")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Post repository for database operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new post; blank text is stored as NULL
    pub async fn create(&self, author_id: Uuid, text: Option<&str>) -> ApiResult<Post> {
        let text = text.map(str::trim).filter(|t| !t.is_empty());

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO posts (author_id, text)
            VALUES ($1, $2)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        info!("User {} created a post", author_id);
        post_from_row(&row)
    }

    /// Get a post by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    /// Delete a post; only its author may do so
    pub async fn delete(&self, post_id: Uuid, caller_id: Uuid) -> ApiResult<()> {
        let post = self
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

        if post.author_id != caller_id {
            return Err(ApiError::Forbidden);
        }

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        info!("User {} deleted post {}", caller_id, post_id);
        Ok(())
    }

    /// Flip the caller's membership in the post's liker set
    ///
    /// The row is locked for the duration, so the flip always works on the
    /// stored state rather than whatever the caller last saw, and `likes`
    /// moves with `liked_by` in the same statement. Repeated calls alternate.
    pub async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> ApiResult<Post> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1 FOR UPDATE"
        ))
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

        let post = post_from_row(&row)?;
        let already_liked = post.liked_by.contains(&user_id);

        let updated = if already_liked {
            sqlx::query(&format!(
                r#"
                UPDATE posts
                SET liked_by = array_remove(liked_by, $2),
                    likes = GREATEST(likes - 1, 0)
                WHERE id = $1
                RETURNING {POST_COLUMNS}
                "#
            ))
            .bind(post_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query(&format!(
                r#"
                UPDATE posts
                SET liked_by = array_append(liked_by, $2),
                    likes = likes + 1
                WHERE id = $1
                RETURNING {POST_COLUMNS}
                "#
            ))
            .bind(post_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?
        };

        let post = post_from_row(&updated)?;
        tx.commit().await?;

        Ok(post)
    }

    /// Posts by the given authors, newest first
    pub async fn by_authors(&self, author_ids: &[Uuid]) -> ApiResult<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = ANY($1) \
             ORDER BY created_at DESC"
        ))
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(post_from_row).collect()
    }
}
