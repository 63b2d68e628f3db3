//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
}

/// Owner reference joined into a profile on read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

/// Social links attached to a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Work experience entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// New experience entry (for insertion)
#[derive(Debug, Clone)]
pub struct NewExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// Developer profile, one per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user: UserSummary,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    /// Most recent first
    pub experience: Vec<Experience>,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

/// Profile fields for the create-or-update operation
///
/// `status` and `skills` are written on every call. For the optional fields
/// `None` leaves the stored value untouched on update and unset on create.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
}

/// Like on a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Like {
    pub id: String,
    pub user: String,
}

/// Comment on a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

/// New comment (for insertion)
#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
}

/// Post with its likes and comments
///
/// `name` and `avatar` are a snapshot of the author taken when the post
/// was created; later changes to the user are not reflected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    /// Most recent first
    pub likes: Vec<Like>,
    /// Most recent first
    pub comments: Vec<Comment>,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Whether the given user has liked this post
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|like| like.user == user_id)
    }

    /// Find a comment by its identifier
    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

/// New post (for insertion)
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            avatar: row.try_get("avatar")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Experience {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Experience {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            company: row.try_get("company")?,
            location: row.try_get("location")?,
            from: row.try_get("from_date")?,
            to: row.try_get("to_date")?,
            current: row.try_get("current")?,
            description: row.try_get("description")?,
        })
    }
}

/// Reads a profile row joined with its owner; `experience` is filled separately.
impl TryFrom<&sqlx::sqlite::SqliteRow> for Profile {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let skills: String = row.try_get("skills")?;
        Ok(Profile {
            id: row.try_get("id")?,
            user: UserSummary {
                id: row.try_get("user_id")?,
                name: row.try_get("user_name")?,
                avatar: row.try_get("user_avatar")?,
            },
            company: row.try_get("company")?,
            website: row.try_get("website")?,
            location: row.try_get("location")?,
            bio: row.try_get("bio")?,
            status: row.try_get("status")?,
            githubusername: row.try_get("githubusername")?,
            skills: serde_json::from_str(&skills).map_err(|e| sqlx::Error::ColumnDecode {
                index: "skills".to_string(),
                source: Box::new(e),
            })?,
            social: SocialLinks {
                youtube: row.try_get("youtube")?,
                twitter: row.try_get("twitter")?,
                facebook: row.try_get("facebook")?,
                linkedin: row.try_get("linkedin")?,
                instagram: row.try_get("instagram")?,
            },
            experience: Vec::new(),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Like {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Like {
            id: row.try_get("id")?,
            user: row.try_get("user_id")?,
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Comment {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: row.try_get("id")?,
            user: row.try_get("user_id")?,
            text: row.try_get("text")?,
            name: row.try_get("name")?,
            avatar: row.try_get("avatar")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

/// Reads a post row; `likes` and `comments` are filled separately.
impl TryFrom<&sqlx::sqlite::SqliteRow> for Post {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.try_get("id")?,
            user: row.try_get("user_id")?,
            text: row.try_get("text")?,
            name: row.try_get("name")?,
            avatar: row.try_get("avatar")?,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}
