//! Signup, login, logout, refresh and profile flows

use std::sync::Arc;

use crate::auth::jwt::{TokenError, TokenIssuer};
use crate::auth::models::{
    AuthResponse, LoginRequest, PublicUser, SignupRequest, UpdateProfileRequest, User,
};
use crate::auth::password::PasswordHasher;
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::store::{SharedStore, UserStore};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
const INVALID_TOKEN: &str = "Invalid token.";

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    /// Goes into the http-only cookie, never into the body
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Orchestrates the credential store, password hasher and token issuer
pub struct AuthService {
    store: SharedStore,
    tokens: TokenIssuer,
    hasher: PasswordHasher,
    strict_refresh: bool,
}

impl AuthService {
    pub fn new(config: &AuthConfig, store: SharedStore) -> Result<Self> {
        Ok(Self {
            store,
            tokens: TokenIssuer::new(config)?,
            hasher: PasswordHasher::new(config.bcrypt_cost)?,
            strict_refresh: config.strict_refresh,
        })
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Create an account with no active session
    pub async fn signup(&self, req: SignupRequest) -> Result<PublicUser> {
        let req = req.validate()?;
        let password_hash = self.hasher.hash(&req.password).await?;

        let user = User::new(req.username, req.email, password_hash);
        let user = match self.store.create_user(user).await {
            Ok(user) => user,
            Err(Error::Conflict(msg)) => {
                tracing::warn!("Signup rejected: email or username already exists");
                return Err(Error::Conflict(msg));
            }
            Err(e) => return Err(e),
        };

        tracing::info!(user_id = %user.id, "New user signed up");
        Ok(user.into())
    }

    /// Verify credentials, issue both tokens and store the refresh token
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome> {
        let req = req.validate()?;

        let user = match self.store.find_user_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_dummy(&req.password).await?;
                tracing::warn!("Failed login attempt: unknown account");
                return Err(Error::unauthorized(INVALID_CREDENTIALS));
            }
        };

        if !self.hasher.verify(&req.password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, "Failed login attempt: wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let access_token = self.tokens.issue_access_token(&user.id)?;
        let refresh_token = self.tokens.issue_refresh_token(&user.id)?;

        // Overwriting is what revokes earlier sessions
        if !self.store.set_refresh_token(&user.id, Some(refresh_token.as_str())).await? {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }

    /// Clear the stored refresh token of an authenticated user
    pub async fn logout(&self, user_id: Option<&str>) -> Result<()> {
        let Some(user_id) = user_id else {
            tracing::warn!("Logout attempt without a user context");
            return Err(Error::unauthorized("Unauthorized"));
        };

        let user = self.store.find_user_by_id(user_id).await?;
        let Some(stored) = user.and_then(|u| u.refresh_token) else {
            return Err(Error::not_found("User not found or not logged in"));
        };

        if self.tokens.verify_refresh_token(&stored).is_err() {
            tracing::warn!(user_id, "Stored refresh token no longer valid on logout");
            return Err(Error::forbidden("Invalid refresh token"));
        }

        if !self
            .store
            .swap_refresh_token(user_id, Some(stored.as_str()), None)
            .await?
        {
            // A concurrent login replaced the token; that newer session stays
            tracing::warn!(user_id, "Refresh token changed during logout, left in place");
        }

        tracing::info!(user_id, "User logged out");
        Ok(())
    }

    /// Exchange the refresh cookie for a new access token
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthResponse> {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            tracing::warn!("Refresh attempt without a token");
            return Err(Error::unauthorized("No token found"));
        };

        let claims = self.tokens.verify_refresh_token(token).map_err(|e| {
            tracing::warn!("Refresh attempt with rejected token: {}", e);
            Error::forbidden(INVALID_TOKEN)
        })?;
        let user_id = claims.user_id.unwrap_or_default();

        let Some(user) = self.store.find_user_by_id(&user_id).await? else {
            return Err(Error::not_found("User not found"));
        };

        if self.strict_refresh && user.refresh_token.as_deref() != Some(token) {
            tracing::warn!(user_id = %user.id, "Refresh token does not match the stored one");
            return Err(Error::forbidden(INVALID_TOKEN));
        }

        let access_token = self.tokens.issue_access_token(&user.id)?;
        tracing::info!(user_id = %user.id, "Token refreshed");

        Ok(AuthResponse {
            access_token,
            user: user.into(),
        })
    }

    /// Apply a partial income/goal update
    pub async fn update_profile(
        &self,
        user_id: Option<&str>,
        req: UpdateProfileRequest,
    ) -> Result<PublicUser> {
        let Some(user_id) = user_id else {
            return Err(Error::unauthorized("Unauthorized"));
        };
        let update = req.validate()?;

        let user = self
            .store
            .update_profile(user_id, &update)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))?;

        tracing::info!(user_id, "User profile updated");
        Ok(user.into())
    }

    /// Resolve an access token to its user
    pub async fn authenticate(&self, access_token: &str) -> Result<PublicUser> {
        let claims = self
            .tokens
            .verify_access_token(access_token)
            .map_err(|e| match e {
                TokenError::Expired => {
                    tracing::warn!("Access token expired");
                    Error::unauthorized(SESSION_EXPIRED)
                }
                TokenError::Invalid => {
                    tracing::warn!("Access token rejected");
                    Error::forbidden(INVALID_TOKEN)
                }
                TokenError::MissingSubject => {
                    tracing::warn!("Access token without user id");
                    Error::forbidden("Invalid token payload.")
                }
            })?;

        let user_id = claims.user_id.unwrap_or_default();
        match self.store.find_user_by_id(&user_id).await? {
            Some(user) => Ok(user.into()),
            None => Err(Error::unauthorized(INVALID_TOKEN)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BCRYPT_COST;
    use crate::store::MemoryStore;

    fn service() -> AuthService {
        let config = AuthConfig {
            access_token_secret: "access-secret".to_string(),
            refresh_token_secret: "refresh-secret".to_string(),
            bcrypt_cost: MIN_BCRYPT_COST,
            ..AuthConfig::default()
        };
        AuthService::new(&config, Arc::new(MemoryStore::new())).unwrap()
    }

    fn ana() -> SignupRequest {
        SignupRequest {
            username: "ana".into(),
            email: "ana@x.com".into(),
            password: "secret1".into(),
        }
    }

    fn ana_login(password: &str) -> LoginRequest {
        LoginRequest {
            email: "ana@x.com".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let auth = service();
        let user = auth.signup(ana()).await.unwrap();
        assert_eq!(user.username, "ana");

        let outcome = auth.login(ana_login("secret1")).await.unwrap();
        assert_eq!(outcome.user.id, user.id);

        let resolved = auth.authenticate(&outcome.access_token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_login_stores_refresh_token() {
        let auth = service();
        auth.signup(ana()).await.unwrap();
        let outcome = auth.login(ana_login("secret1")).await.unwrap();

        let stored = auth.store().find_user_by_id(&outcome.user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(outcome.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let auth = service();
        auth.signup(ana()).await.unwrap();

        let wrong = auth.login(ana_login("nope")).await.unwrap_err();
        let unknown = auth
            .login(LoginRequest { email: "bob@x.com".into(), password: "secret1".into() })
            .await
            .unwrap_err();

        assert_eq!(wrong.status(), unknown.status());
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_logout_then_refresh_is_rejected() {
        let auth = service();
        auth.signup(ana()).await.unwrap();
        let outcome = auth.login(ana_login("secret1")).await.unwrap();

        auth.logout(Some(outcome.user.id.as_str())).await.unwrap();
        let err = auth.refresh(Some(outcome.refresh_token.as_str())).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        // Second logout has nothing to clear
        let err = auth.logout(Some(outcome.user.id.as_str())).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_logout_without_user_context() {
        let err = service().logout(None).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_superseded_refresh_token_is_rejected() {
        let auth = service();
        auth.signup(ana()).await.unwrap();
        let first = auth.login(ana_login("secret1")).await.unwrap();
        let second = auth.login(ana_login("secret1")).await.unwrap();

        assert!(auth.refresh(Some(first.refresh_token.as_str())).await.is_err());
        assert!(auth.refresh(Some(second.refresh_token.as_str())).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_without_cookie() {
        let err = service().refresh(None).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let auth = service();
        auth.signup(ana()).await.unwrap();
        let outcome = auth.login(ana_login("secret1")).await.unwrap();

        let err = auth.refresh(Some(outcome.access_token.as_str())).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }
}
