//! Client-side session state

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::models::PublicUser;

/// Who is signed in and with which access token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<PublicUser>,
    pub access_token: Option<String>,
}

/// Session context handed to request code and UI components.
/// Populated on bootstrap, login and refresh; cleared on logout or failed refresh.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    state: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, user: PublicUser, access_token: String) {
        let mut state = self.state.write().await;
        state.user = Some(user);
        state.access_token = Some(access_token);
    }

    /// Replace the token, keeping the current user
    pub async fn set_access_token(&self, access_token: String) {
        self.state.write().await.access_token = Some(access_token);
    }

    pub async fn set_user(&self, user: PublicUser) {
        self.state.write().await.user = Some(user);
    }

    pub async fn clear(&self) {
        *self.state.write().await = SessionState::default();
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn user(&self) -> Option<PublicUser> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.access_token.is_some()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> PublicUser {
        PublicUser {
            id: "1".into(),
            username: "ana".into(),
            email: "ana@x.com".into(),
            monthly_income: None,
            goal: None,
        }
    }

    #[tokio::test]
    async fn test_populate_and_clear() {
        let session = SessionContext::new();
        assert!(!session.is_authenticated().await);

        session.set(ana(), "token-1".into()).await;
        assert!(session.is_authenticated().await);
        assert_eq!(session.user().await.unwrap().username, "ana");

        session.set_access_token("token-2".into()).await;
        assert_eq!(session.access_token().await.as_deref(), Some("token-2"));
        assert!(session.user().await.is_some());

        session.clear().await;
        assert_eq!(session.snapshot().await, SessionState::default());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let session = SessionContext::new();
        let view = session.clone();
        session.set(ana(), "token".into()).await;
        assert!(view.is_authenticated().await);
    }
}
