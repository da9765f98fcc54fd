//! HTTP client with bearer attachment and refresh-on-401

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::session::SessionContext;
use crate::api::API_PREFIX;
use crate::auth::models::{
    AuthResponse, LoginRequest, PublicUser, SignupRequest, UpdateProfileRequest,
};
use crate::error::{Error, Result};
use crate::expenses::{CreateExpenseRequest, Expense, Insights};

#[derive(Deserialize)]
struct UserEnvelope {
    user: PublicUser,
}

#[derive(Deserialize)]
struct ExpenseEnvelope {
    expense: Expense,
}

#[derive(Deserialize)]
struct ExpensesEnvelope {
    expenses: Vec<Expense>,
}

#[derive(Deserialize)]
struct InsightsEnvelope {
    insights: Insights,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the Clarity API that keeps a [`SessionContext`] current
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// `server_url` is the server root, e.g. `http://localhost:5000`
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_session(server_url, SessionContext::new())
    }

    pub fn with_session(server_url: &str, session: SessionContext) -> Result<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: format!("{}{}", server_url.trim_end_matches('/'), API_PREFIX),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Try to restore a session from the refresh cookie. Runs once at startup.
    pub async fn bootstrap(&self) -> bool {
        match self.refresh_session().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("No session restored: {}", e);
                self.session.clear().await;
                false
            }
        }
    }

    /// Exchange the refresh cookie for a new access token and store it
    pub async fn refresh_session(&self) -> Result<()> {
        let response = self.http.get(self.url("/refresh-token")).send().await?;
        let auth: AuthResponse = parse(response).await?;
        self.session.set(auth.user, auth.access_token).await;
        Ok(())
    }

    /// One attempt, with the bearer token when there is one
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = self.session.access_token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Send an authenticated request. A 401 triggers one silent refresh and one retry.
    /// The session is cleared when the refresh fails or the retry is rejected again;
    /// any other status on the retry is returned as-is.
    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut retried = false;
        loop {
            let response = match self.execute(method.clone(), path, body).await {
                Ok(response) => response,
                Err(e) if retried => {
                    self.session.clear().await;
                    return Err(e);
                }
                Err(e) => return Err(e),
            };

            if retried {
                if response.status() == StatusCode::UNAUTHORIZED {
                    tracing::warn!("Still unauthorized after refresh, signing out");
                    self.session.clear().await;
                }
                return Ok(response);
            }
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }
            retried = true;

            if let Err(e) = self.refresh_session().await {
                tracing::warn!("Silent refresh failed, signing out: {}", e);
                self.session.clear().await;
                return Ok(response);
            }
        }
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        parse(self.dispatch(method, path, body).await?).await
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<PublicUser> {
        let response = self.execute(Method::POST, "/signup", Some(req)).await?;
        parse::<UserEnvelope>(response).await.map(|e| e.user)
    }

    /// Log in and populate the session
    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = match self.execute(Method::POST, "/login", Some(&req)).await {
            Ok(response) => parse::<AuthResponse>(response).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(auth) => {
                self.session.set(auth.user.clone(), auth.access_token).await;
                Ok(auth.user)
            }
            Err(e) => {
                self.session.clear().await;
                Err(e)
            }
        }
    }

    /// Log out on the server; the local session is cleared either way
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .send::<serde_json::Value, ()>(Method::GET, "/logout", None)
            .await
            .map(|_| ());
        self.session.clear().await;
        result
    }

    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<PublicUser> {
        let envelope: UserEnvelope = self
            .send(Method::PATCH, "/update-income-goal", Some(req))
            .await?;
        self.session.set_user(envelope.user.clone()).await;
        Ok(envelope.user)
    }

    pub async fn create_expense(&self, req: &CreateExpenseRequest) -> Result<Expense> {
        self.send::<ExpenseEnvelope, _>(Method::POST, "/expenses", Some(req))
            .await
            .map(|e| e.expense)
    }

    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.send::<ExpensesEnvelope, ()>(Method::GET, "/expenses", None)
            .await
            .map(|e| e.expenses)
    }

    pub async fn delete_expense(&self, id: &str) -> Result<()> {
        self.send::<serde_json::Value, ()>(Method::DELETE, &format!("/expenses/{}", id), None)
            .await
            .map(|_| ())
    }

    pub async fn insights(&self) -> Result<Insights> {
        self.send::<InsightsEnvelope, ()>(Method::GET, "/expenses/insights", None)
            .await
            .map(|e| e.insights)
    }
}

/// Decode a success body or turn the response into [`Error::Api`]
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or(text);

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
