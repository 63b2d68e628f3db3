//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Default token lifetime: 100 hours
pub const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 360_000;

/// Identity carried inside the token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenUser {
    pub id: String,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub user: TokenUser,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry: Duration::seconds(token_expiry_secs),
        }
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        self.encode_claims(user_id, now, now + self.token_expiry.num_seconds())
    }

    fn encode_claims(&self, user_id: &str, iat: i64, exp: i64) -> Result<String, AuthError> {
        let claims = Claims {
            user: TokenUser {
                id: user_id.to_string(),
            },
            exp,
            iat,
        };

        debug!("Generating token for user: {}", user_id);

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate a JWT token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::Jwt(e),
                }
            })?;

        // Check expiration
        let now = Utc::now().timestamp();
        if token_data.claims.exp < now {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation_and_validation() {
        let manager = JwtManager::new("test-secret-key", DEFAULT_TOKEN_EXPIRY_SECS);

        let token = manager.generate_token("user-1").unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.user.id, "user-1");
        assert_eq!(claims.exp - claims.iat, 360_000);
    }

    #[test]
    fn test_invalid_token() {
        let manager = JwtManager::new("test-secret-key", DEFAULT_TOKEN_EXPIRY_SECS);

        let result = manager.validate_token("invalid-token");
        assert!(matches!(result, Err(AuthError::Jwt(_))));
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let issuer = JwtManager::new("secret-a", DEFAULT_TOKEN_EXPIRY_SECS);
        let verifier = JwtManager::new("secret-b", DEFAULT_TOKEN_EXPIRY_SECS);

        let token = issuer.generate_token("user-1").unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new("test-secret-key", DEFAULT_TOKEN_EXPIRY_SECS);

        let issued = Utc::now().timestamp() - 7200;
        let token = manager.encode_claims("user-1", issued, issued + 3600).unwrap();

        let result = manager.validate_token(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_token_failures_share_a_message() {
        let manager = JwtManager::new("test-secret-key", DEFAULT_TOKEN_EXPIRY_SECS);
        let other = JwtManager::new("other-secret", DEFAULT_TOKEN_EXPIRY_SECS);

        let issued = Utc::now().timestamp() - 7200;
        let expired = manager.encode_claims("user-1", issued, issued + 3600).unwrap();
        let foreign = other.generate_token("user-1").unwrap();

        let messages: Vec<_> = [expired.as_str(), foreign.as_str(), "garbage"]
            .into_iter()
            .map(|t| manager.validate_token(t).unwrap_err().status_and_message())
            .collect();

        assert!(messages.iter().all(|m| *m == messages[0]));
        assert_eq!(messages[0].1, "Token is not valid");
    }
}
