//! Request/Response DTOs

use chrono::{DateTime, NaiveDate};
use devnet_db::{NewExperience, ProfileFields, SocialLinks};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ApiError, FieldError};

// ==================== Common Types ====================

/// Token response for registration and login
#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Treat absent and blank values alike
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ==================== Auth Types ====================

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// ==================== Profile Types ====================

/// Create-or-update profile request
///
/// `skills` is a comma separated list.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[validate(
        required(message = "Status is required"),
        length(min = 1, message = "Status is required")
    )]
    pub status: Option<String>,
    pub githubusername: Option<String>,
    #[validate(
        required(message = "Skills is required"),
        length(min = 1, message = "Skills is required")
    )]
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// Split a comma separated skill list into trimmed entries
pub fn parse_skills(skills: &str) -> Vec<String> {
    skills
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Blank `status` or `skills` pass the length check but are rejected here,
/// after trimming.
impl TryFrom<ProfileRequest> for ProfileFields {
    type Error = ApiError;

    fn try_from(request: ProfileRequest) -> Result<Self, Self::Error> {
        let status = non_empty(request.status);
        let skills = non_empty(request.skills)
            .map(|s| parse_skills(&s))
            .filter(|s| !s.is_empty());

        let mut errors = Vec::new();
        if skills.is_none() {
            errors.push(FieldError::new("skills", "Skills is required"));
        }
        if status.is_none() {
            errors.push(FieldError::new("status", "Status is required"));
        }
        let (Some(status), Some(skills)) = (status, skills) else {
            return Err(ApiError::Validation(errors));
        };

        Ok(ProfileFields {
            company: non_empty(request.company),
            website: non_empty(request.website),
            location: non_empty(request.location),
            bio: non_empty(request.bio),
            status,
            githubusername: non_empty(request.githubusername),
            skills,
            social: SocialLinks {
                youtube: non_empty(request.youtube),
                twitter: non_empty(request.twitter),
                facebook: non_empty(request.facebook),
                linkedin: non_empty(request.linkedin),
                instagram: non_empty(request.instagram),
            },
        })
    }
}

/// Add experience request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ExperienceRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title is required")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Company is required"),
        length(min = 1, message = "Company is required")
    )]
    pub company: Option<String>,
    pub location: Option<String>,
    #[validate(
        required(message = "From date is required"),
        length(min = 1, message = "From date is required")
    )]
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

/// Accepts a plain date or a full RFC3339 timestamp
fn parse_date(field: &str, value: &str) -> Result<NaiveDate, FieldError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| FieldError::new(field, format!("{} is not a valid date", value)))
}

impl TryFrom<ExperienceRequest> for NewExperience {
    type Error = ApiError;

    fn try_from(request: ExperienceRequest) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let from = match request.from.as_deref().map(|v| parse_date("from", v)) {
            Some(Ok(date)) => Some(date),
            Some(Err(e)) => {
                errors.push(e);
                None
            }
            None => {
                errors.push(FieldError::new("from", "From date is required"));
                None
            }
        };

        let to = match non_empty(request.to).map(|v| parse_date("to", &v)) {
            Some(Ok(date)) => Some(date),
            Some(Err(e)) => {
                errors.push(e);
                None
            }
            None => None,
        };

        match from {
            Some(from) if errors.is_empty() => Ok(NewExperience {
                title: request.title.unwrap_or_default().trim().to_string(),
                company: request.company.unwrap_or_default().trim().to_string(),
                location: non_empty(request.location),
                from,
                to,
                current: request.current,
                description: non_empty(request.description),
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

// ==================== Post Types ====================

/// Post or comment body
#[derive(Debug, Deserialize, Validate)]
pub struct TextRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}
