//! Database repository implementation

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::error::DbError;

// Submodules
mod posts;
mod profiles;
mod users;

/// Database connection and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, DbError> {
        info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Check that the store answers a trivial query
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        // Create tables if they don't exist
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                avatar TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                company TEXT,
                website TEXT,
                location TEXT,
                bio TEXT,
                status TEXT NOT NULL,
                githubusername TEXT,
                skills TEXT NOT NULL DEFAULT '[]',
                youtube TEXT,
                twitter TEXT,
                facebook TEXT,
                linkedin TEXT,
                instagram TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS experiences (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT,
                from_date TEXT NOT NULL,
                to_date TEXT,
                current INTEGER NOT NULL DEFAULT 0,
                description TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_experiences_profile ON experiences(profile_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Posts keep no foreign key to users: deleting a user leaves their posts behind.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                text TEXT NOT NULL,
                name TEXT NOT NULL,
                avatar TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS post_likes (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                UNIQUE (post_id, user_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS post_comments (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                text TEXT NOT NULL,
                name TEXT NOT NULL,
                avatar TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_post_comments_post ON post_comments(post_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;
    use crate::models::NewUser;
    use crate::models::User;

    /// Open a fresh database in a temporary directory
    pub async fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("devnet.db").display());
        let db = Database::new(&url, 1).await.unwrap();
        (db, dir)
    }

    pub async fn create_user(db: &Database, name: &str, email: &str) -> User {
        db.insert_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            avatar: format!("https://avatar.test/{name}"),
        })
        .await
        .unwrap()
    }
}
