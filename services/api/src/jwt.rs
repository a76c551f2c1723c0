//! JWT service for token generation and validation
//!
//! Access and refresh tokens are HS256-signed with separate secrets. The
//! refresh token currently stored on the user row is the only one accepted
//! for rotation.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_ACCESS_TOKEN_SECRET`: Secret for signing access tokens
    /// - `JWT_REFRESH_TOKEN_SECRET`: Secret for signing refresh tokens
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let access_secret = std::env::var("JWT_ACCESS_TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_ACCESS_TOKEN_SECRET environment variable not set"))?;

        let refresh_secret = std::env::var("JWT_REFRESH_TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_REFRESH_TOKEN_SECRET environment variable not set"))?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string()) // 15 minutes
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            access_secret,
            refresh_secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            access_encoding_key: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding_key: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation,
            config,
        }
    }

    fn now() -> Result<u64> {
        Ok(SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs())
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String> {
        let now = Self::now()?;

        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + self.config.access_token_expiry,
            token_type: TokenType::Access,
        };

        let token = encode(&Header::default(), &claims, &self.access_encoding_key)?;
        Ok(token)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String> {
        let now = Self::now()?;

        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + self.config.refresh_token_expiry,
            token_type: TokenType::Refresh,
        };

        let token = encode(&Header::default(), &claims, &self.refresh_encoding_key)?;
        Ok(token)
    }

    /// Validate an access token and return the claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.access_decoding_key, &self.validation)?;
        if token_data.claims.token_type != TokenType::Access {
            anyhow::bail!("Token is not an access token");
        }
        Ok(token_data.claims)
    }

    /// Validate a refresh token and return the claims
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.refresh_decoding_key, &self.validation)?;
        if token_data.claims.token_type != TokenType::Refresh {
            anyhow::bail!("Token is not a refresh token");
        }
        Ok(token_data.claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        })
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.generate_access_token(user_id).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.generate_refresh_token(user_id).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_token_type_confusion_is_rejected() {
        let service = service();
        let user_id = Uuid::new_v4();

        let access = service.generate_access_token(user_id).unwrap();
        let refresh = service.generate_refresh_token(user_id).unwrap();

        // Different secrets and an explicit type check both stand in the way.
        assert!(service.validate_refresh_token(&access).is_err());
        assert!(service.validate_access_token(&refresh).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = service();
        assert!(service.validate_access_token("not.a.token").is_err());
    }
}
