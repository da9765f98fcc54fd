//! JWT token handling

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Unique token ID
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    /// Claims for `user_id`, valid for `ttl` from now
    pub fn for_user(user_id: &str, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            user_id: Some(user_id.to_string()),
            iat: now,
            exp: now.saturating_add(ttl),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.exp
    }
}

/// Which secret and lifetime a token uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("token payload has no user id")]
    MissingSubject,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signs and verifies access and refresh tokens
pub struct TokenIssuer {
    access: Keys,
    refresh: Keys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenIssuer {
    /// Build from config. Missing secrets are a startup error.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            access: Keys::from_secret(&config.access_token_secret),
            refresh: Keys::from_secret(&config.refresh_token_secret),
            access_ttl: config.access_ttl()?,
            refresh_ttl: config.refresh_ttl()?,
            validation,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn keys(&self, kind: TokenKind) -> &Keys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Sign arbitrary claims with the secret for `kind`
    pub fn sign(&self, kind: TokenKind, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys(kind).encoding)
            .map_err(|e| Error::Other(format!("Failed to create token: {}", e)))
    }

    pub fn issue_access_token(&self, user_id: &str) -> Result<String> {
        self.sign(TokenKind::Access, &Claims::for_user(user_id, self.access_ttl))
    }

    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String> {
        self.sign(TokenKind::Refresh, &Claims::for_user(user_id, self.refresh_ttl))
    }

    /// Check signature and expiry, returning the claims with a user id present
    pub fn verify(&self, kind: TokenKind, token: &str) -> std::result::Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        match data.claims.user_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(data.claims),
            _ => Err(TokenError::MissingSubject),
        }
    }

    pub fn verify_access_token(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        self.verify(TokenKind::Access, token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        self.verify(TokenKind::Refresh, token)
    }
}
