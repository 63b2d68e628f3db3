//! Profile operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Experience, NewExperience, Profile, ProfileFields};
use crate::repository::Database;
use crate::utils::{format_timestamp, new_id};

const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.user_id, u.name AS user_name, u.avatar AS user_avatar,
           p.company, p.website, p.location, p.bio, p.status, p.githubusername,
           p.skills, p.youtube, p.twitter, p.facebook, p.linkedin, p.instagram,
           p.created_at
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

impl Database {
    // ==================== Profile Operations ====================

    /// Get the profile owned by a user, with owner and experience loaded
    pub async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>, DbError> {
        let row = sqlx::query(&format!("{PROFILE_SELECT} WHERE p.user_id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut profile = Profile::try_from(&row)?;
                profile.experience = self.list_experience(&profile.id).await?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// List all profiles
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, DbError> {
        let rows = sqlx::query(&format!("{PROFILE_SELECT} ORDER BY p.created_at"))
            .fetch_all(&self.pool)
            .await?;

        let mut profiles = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut profile = Profile::try_from(row)?;
            profile.experience = self.list_experience(&profile.id).await?;
            profiles.push(profile);
        }
        Ok(profiles)
    }

    /// Create the user's profile, or update the provided fields of an existing one
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> Result<Profile, DbError> {
        let skills = serde_json::to_string(&fields.skills)?;

        let existing = sqlx::query("SELECT id FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            sqlx::query(
                r#"
                UPDATE profiles SET
                    company = COALESCE(?, company),
                    website = COALESCE(?, website),
                    location = COALESCE(?, location),
                    bio = COALESCE(?, bio),
                    status = ?,
                    githubusername = COALESCE(?, githubusername),
                    skills = ?,
                    youtube = COALESCE(?, youtube),
                    twitter = COALESCE(?, twitter),
                    facebook = COALESCE(?, facebook),
                    linkedin = COALESCE(?, linkedin),
                    instagram = COALESCE(?, instagram)
                WHERE user_id = ?
                "#,
            )
            .bind(&fields.company)
            .bind(&fields.website)
            .bind(&fields.location)
            .bind(&fields.bio)
            .bind(&fields.status)
            .bind(&fields.githubusername)
            .bind(&skills)
            .bind(&fields.social.youtube)
            .bind(&fields.social.twitter)
            .bind(&fields.social.facebook)
            .bind(&fields.social.linkedin)
            .bind(&fields.social.instagram)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO profiles (
                    id, user_id, company, website, location, bio, status, githubusername,
                    skills, youtube, twitter, facebook, linkedin, instagram, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(new_id())
            .bind(user_id)
            .bind(&fields.company)
            .bind(&fields.website)
            .bind(&fields.location)
            .bind(&fields.bio)
            .bind(&fields.status)
            .bind(&fields.githubusername)
            .bind(&skills)
            .bind(&fields.social.youtube)
            .bind(&fields.social.twitter)
            .bind(&fields.social.facebook)
            .bind(&fields.social.linkedin)
            .bind(&fields.social.instagram)
            .bind(format_timestamp(&Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::on_insert(e, format!("Profile for user '{}'", user_id)))?;
        }

        self.get_profile_by_user(user_id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Profile for user '{}'", user_id)))
    }

    /// Delete the profile owned by a user (experience entries go with it)
    pub async fn delete_profile(&self, user_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Experience Operations ====================

    /// Prepend an experience entry to the user's profile
    ///
    /// Returns `false` when the user has no profile.
    pub async fn add_experience(
        &self,
        user_id: &str,
        experience: NewExperience,
    ) -> Result<bool, DbError> {
        let Some(row) = sqlx::query("SELECT id FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(false);
        };
        let profile_id: String = row.try_get("id")?;

        sqlx::query(
            r#"
            INSERT INTO experiences (
                id, profile_id, title, company, location, from_date, to_date, current, description
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_id())
        .bind(&profile_id)
        .bind(&experience.title)
        .bind(&experience.company)
        .bind(&experience.location)
        .bind(experience.from)
        .bind(experience.to)
        .bind(experience.current)
        .bind(&experience.description)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// Experience entries of a profile, most recent first
    async fn list_experience(&self, profile_id: &str) -> Result<Vec<Experience>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, company, location, from_date, to_date, current, description
            FROM experiences
            WHERE profile_id = ?
            ORDER BY seq DESC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Experience::try_from(row).map_err(DbError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::models::{NewExperience, ProfileFields, SocialLinks};
    use crate::repository::test_support::{create_user, test_db};

    fn fields(status: &str, skills: &[&str]) -> ProfileFields {
        ProfileFields {
            status: status.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn experience(title: &str, from: &str) -> NewExperience {
        NewExperience {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            from: NaiveDate::parse_from_str(from, "%Y-%m-%d").unwrap(),
            to: None,
            current: true,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_profile_joins_user() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "alice", "alice@example.com").await;

        let mut new = fields("Developer", &["rust", "sql"]);
        new.company = Some("Acme".to_string());
        let profile = db.upsert_profile(&user.id, new).await.unwrap();

        assert_eq!(profile.user.id, user.id);
        assert_eq!(profile.user.name, "alice");
        assert_eq!(profile.user.avatar, user.avatar);
        assert_eq!(profile.status, "Developer");
        assert_eq!(profile.skills, vec!["rust", "sql"]);
        assert_eq!(profile.company.as_deref(), Some("Acme"));
        assert!(profile.bio.is_none());
        assert!(profile.experience.is_empty());
    }

    #[tokio::test]
    async fn test_update_only_overwrites_provided_fields() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "alice", "alice@example.com").await;

        let mut new = fields("Developer", &["rust"]);
        new.bio = Some("Hello".to_string());
        new.social = SocialLinks {
            twitter: Some("https://twitter.com/alice".to_string()),
            ..Default::default()
        };
        let created = db.upsert_profile(&user.id, new).await.unwrap();

        let mut update = fields("Senior Developer", &["rust", "go"]);
        update.social.youtube = Some("https://youtube.com/alice".to_string());
        let updated = db.upsert_profile(&user.id, update).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status, "Senior Developer");
        assert_eq!(updated.skills, vec!["rust", "go"]);
        assert_eq!(updated.bio.as_deref(), Some("Hello"));
        assert_eq!(updated.social.twitter.as_deref(), Some("https://twitter.com/alice"));
        assert_eq!(updated.social.youtube.as_deref(), Some("https://youtube.com/alice"));
        assert_eq!(db.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_experience_is_most_recent_first() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "alice", "alice@example.com").await;
        db.upsert_profile(&user.id, fields("Developer", &["rust"])).await.unwrap();

        assert!(db.add_experience(&user.id, experience("Junior", "2018-01-01")).await.unwrap());
        assert!(db.add_experience(&user.id, experience("Eng", "2020-01-01")).await.unwrap());

        let profile = db.get_profile_by_user(&user.id).await.unwrap().unwrap();
        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.experience[0].title, "Eng");
        assert_eq!(profile.experience[1].title, "Junior");
    }

    #[tokio::test]
    async fn test_add_experience_without_profile() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "alice", "alice@example.com").await;

        let added = db.add_experience(&user.id, experience("Eng", "2020-01-01")).await.unwrap();
        assert!(!added);
    }

    #[tokio::test]
    async fn test_delete_profile_and_user() {
        let (db, _dir) = test_db().await;
        let user = create_user(&db, "alice", "alice@example.com").await;
        db.upsert_profile(&user.id, fields("Developer", &["rust"])).await.unwrap();
        db.add_experience(&user.id, experience("Eng", "2020-01-01")).await.unwrap();

        assert!(db.delete_profile(&user.id).await.unwrap());
        assert!(db.delete_user(&user.id).await.unwrap());

        assert!(db.get_profile_by_user(&user.id).await.unwrap().is_none());
        assert!(db.get_user_by_id(&user.id).await.unwrap().is_none());
        assert!(!db.delete_profile(&user.id).await.unwrap());
    }
}
