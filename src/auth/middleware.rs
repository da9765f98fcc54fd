//! Authentication extractors

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

use crate::auth::models::PublicUser;
use crate::auth::service::AuthService;
use crate::error::{Error, Result};

const NOT_LOGGED_IN: &str = "You are not logged in. Please login to get access.";

/// The authenticated caller, resolved from the bearer access token
#[derive(Debug, Clone)]
pub struct AuthUser(pub PublicUser);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let auth = Arc::<AuthService>::from_ref(state);
        let token = bearer_token(&parts.headers)?;
        auth.authenticate(token).await.map(AuthUser)
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("No token provided");
            Error::unauthorized(NOT_LOGGED_IN)
        })?;

    match value.trim().split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => {
            tracing::warn!("Malformed authorization header");
            Err(Error::unauthorized(NOT_LOGGED_IN))
        }
    }
}

/// Read a cookie value from the request headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
