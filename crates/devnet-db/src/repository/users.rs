//! User operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;
use crate::utils::{format_timestamp, new_id};

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Emails are compared case-insensitively; a second registration with
    /// the same address fails with [`DbError::Duplicate`].
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        // Check if user already exists
        let existing = self.get_user_by_email(&user.email).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.email)));
        }

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, avatar, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(format_timestamp(&now))
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::on_insert(e, format!("User '{}' already exists", user.email)))?;

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            avatar: user.avatar,
            created_at: now,
        })
    }

    /// Get a user by email (case-insensitive)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete a user
    pub async fn delete_user(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::models::NewUser;
    use crate::repository::test_support::{create_user, test_db};

    #[tokio::test]
    async fn test_insert_and_fetch_user() {
        let (db, _dir) = test_db().await;

        let user = create_user(&db, "alice", "alice@example.com").await;

        let by_id = db.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "alice");
        assert_eq!(by_id.email, "alice@example.com");

        let by_email = db.get_user_by_email("ALICE@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let (db, _dir) = test_db().await;

        let first = create_user(&db, "alice", "alice@example.com").await;

        let result = db
            .insert_user(NewUser {
                name: "mallory".to_string(),
                email: "Alice@Example.com".to_string(),
                password_hash: "other".to_string(),
                avatar: String::new(),
            })
            .await;
        assert!(matches!(result, Err(DbError::Duplicate(_))));

        // First user is unchanged
        let stored = db.get_user_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "alice");
        assert_eq!(stored.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let (db, _dir) = test_db().await;

        assert!(db.get_user_by_id("not-an-id").await.unwrap().is_none());
        assert!(!db.delete_user("not-an-id").await.unwrap());
    }

    #[tokio::test]
    async fn test_password_hash_is_not_serialized() {
        let (db, _dir) = test_db().await;

        let user = create_user(&db, "alice", "alice@example.com").await;
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["name"], "alice");
        assert!(json.get("date").is_some());
    }
}
