//! Posts Module
//!
//! Post CRUD and the per-read view counter. Only the author of a post may
//! update or delete it.

pub mod handlers;

use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Post, PostDraft, PostRow};

const SELECT_POSTS: &str = r#"
    SELECT p.id, p.title, p.text, p.tags, p.image_url, p.views_count,
           p.created_at, p.updated_at,
           u.id AS user_id, u.full_name AS user_full_name, u.email AS user_email,
           u.avatar_url AS user_avatar_url, u.created_at AS user_created_at
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

pub struct PostManager {
    pool: SqlitePool,
}

impl PostManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All posts, newest first
    pub async fn list(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{SELECT_POSTS} ORDER BY p.created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Fetch a post without touching its view counter
    pub async fn get(&self, id: &str) -> Result<Post> {
        sqlx::query_as::<_, PostRow>(&format!("{SELECT_POSTS} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Post::from)
            .ok_or_else(|| Error::PostNotFound { id: id.to_string() })
    }

    /// Increment the view counter and return the post as seen after the increment
    pub async fn view(&self, id: &str) -> Result<Post> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE posts SET views_count = views_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::PostNotFound { id: id.to_string() });
        }

        let row = sqlx::query_as::<_, PostRow>(&format!("{SELECT_POSTS} WHERE p.id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    pub async fn create(&self, user_id: &str, draft: PostDraft) -> Result<Post> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO posts (id, title, text, tags, image_url, views_count, user_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(Json(&draft.tags))
        .bind(&draft.image_url)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!("[Posts] Created post {} by {}", id, user_id);

        self.get(&id).await
    }

    /// Replace the editable fields of a post owned by `user_id`
    pub async fn update(&self, id: &str, user_id: &str, draft: PostDraft) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE posts SET title = ?, text = ?, tags = ?, image_url = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(Json(&draft.tags))
        .bind(&draft.image_url)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(self.refusal(id, user_id).await);
        }

        info!("[Posts] Updated post {}", id);

        Ok(())
    }

    pub async fn delete(&self, id: &str, user_id: &str) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(self.refusal(id, user_id).await);
        }

        info!("[Posts] Deleted post {}", id);

        Ok(())
    }

    /// Why a write scoped to (`id`, `user_id`) matched no row
    async fn refusal(&self, id: &str, user_id: &str) -> Error {
        let owner = sqlx::query_as::<_, (String,)>("SELECT user_id FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        match owner {
            Err(e) => e.into(),
            Ok(Some((owner,))) if owner != user_id => Error::PostNotOwned {
                post_id: id.to_string(),
                user_id: user_id.to_string(),
            },
            Ok(_) => Error::PostNotFound { id: id.to_string() },
        }
    }
}
