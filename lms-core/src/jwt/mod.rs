//! JWT token handling
//!
//! Tokens are HS256-signed and carry the LMS claim set. The `Authorization`
//! header holds either the raw token or `Bearer <token>`.

use crate::config::JwtConfig;
use crate::error::{AppError, Result};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Identity claims decoded from a caller's token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiration (Unix timestamp)
    #[serde(rename = "ExpiresAt")]
    pub expires_at: i64,
    #[serde(rename = "FullUserName")]
    pub full_user_name: String,
    #[serde(rename = "UserID")]
    pub user_id: i32,
}

/// JWT token manager
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// The claim set carries its own expiry field, so the registered-claim
    /// checks are switched off and `ExpiresAt` is checked after decoding.
    fn validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = false;
        v.validate_aud = false;
        v.required_spec_claims.clear();
        v
    }

    /// Sign a token for the given user
    pub fn create_token(&self, user_id: i32, full_user_name: &str) -> Result<String> {
        let exp = Utc::now() + Duration::seconds(self.config.token_ttl_secs);
        let claims = Claims {
            expires_at: exp.timestamp(),
            full_user_name: full_user_name.to_string(),
            user_id,
        };
        self.sign(&claims)
    }

    /// Sign an arbitrary claim set
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.into()))
    }

    /// Verify a token and return its claims
    pub fn extract_claims(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation())?;
        let claims = token_data.claims;

        if claims.expires_at <= Utc::now().timestamp() {
            return Err(AppError::BadRequest("token expired".to_string()));
        }

        Ok(claims)
    }

    /// Read the `Authorization` header and verify the token it carries
    pub fn claims_from_headers(&self, headers: &HeaderMap) -> Result<Claims> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("missing authorization header".to_string()))?;

        let value = header
            .to_str()
            .map_err(|_| AppError::BadRequest("invalid authorization header".to_string()))?
            .trim();

        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if token.is_empty() {
            return Err(AppError::BadRequest("empty token".to_string()));
        }

        self.extract_claims(token)
    }
}
