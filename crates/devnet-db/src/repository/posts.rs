//! Post, like and comment operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{Comment, Like, NewComment, NewPost, Post};
use crate::repository::Database;
use crate::utils::{format_timestamp, new_id};

impl Database {
    // ==================== Post Operations ====================

    /// Insert a new post
    pub async fn insert_post(&self, post: NewPost) -> Result<Post, DbError> {
        let now = Utc::now();
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, text, name, avatar, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&post.user_id)
        .bind(&post.text)
        .bind(&post.name)
        .bind(&post.avatar)
        .bind(format_timestamp(&now))
        .execute(&self.pool)
        .await?;

        Ok(Post {
            id,
            user: post.user_id,
            text: post.text,
            name: post.name,
            avatar: post.avatar,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
        })
    }

    /// Get a post by ID with likes and comments loaded
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, text, name, avatar, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut post = Post::try_from(&row)?;
                post.likes = self.list_likes(&post.id).await?;
                post.comments = self.list_comments(&post.id).await?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    /// List all posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, text, name, avatar, created_at
            FROM posts
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut post = Post::try_from(row)?;
            post.likes = self.list_likes(&post.id).await?;
            post.comments = self.list_comments(&post.id).await?;
            posts.push(post);
        }
        Ok(posts)
    }

    /// Delete a post along with its likes and comments
    pub async fn delete_post(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Like Operations ====================

    /// Add a like to the front of the post's like list
    ///
    /// A second like by the same user fails with [`DbError::Duplicate`].
    pub async fn add_like(&self, post_id: &str, user_id: &str) -> Result<Like, DbError> {
        let id = new_id();
        sqlx::query("INSERT INTO post_likes (id, post_id, user_id) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::on_insert(e, format!("Like on post '{}'", post_id)))?;

        Ok(Like {
            id,
            user: user_id.to_string(),
        })
    }

    /// Remove the user's like from a post
    pub async fn remove_like(&self, post_id: &str, user_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Likes of a post, most recent first
    pub async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id
            FROM post_likes
            WHERE post_id = ?
            ORDER BY seq DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Like::try_from(row).map_err(DbError::from))
            .collect()
    }

    // ==================== Comment Operations ====================

    /// Add a comment to the front of the post's comment list
    pub async fn add_comment(&self, post_id: &str, comment: NewComment) -> Result<Comment, DbError> {
        let now = Utc::now();
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO post_comments (id, post_id, user_id, text, name, avatar, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(post_id)
        .bind(&comment.user_id)
        .bind(&comment.text)
        .bind(&comment.name)
        .bind(&comment.avatar)
        .bind(format_timestamp(&now))
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id,
            user: comment.user_id,
            text: comment.text,
            name: comment.name,
            avatar: comment.avatar,
            created_at: now,
        })
    }

    /// Remove a single comment from a post
    pub async fn remove_comment(&self, post_id: &str, comment_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM post_comments WHERE post_id = ? AND id = ?")
            .bind(post_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Comments of a post, most recent first
    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, text, name, avatar, created_at
            FROM post_comments
            WHERE post_id = ?
            ORDER BY seq DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Comment::try_from(row).map_err(DbError::from))
            .collect()
    }
}
