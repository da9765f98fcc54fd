//! Authentication models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Reflection goal a user picks during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    /// Understand where the money goes
    Awareness,
    /// Take charge of spending
    Control,
    /// Find financial calm
    Peace,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::Awareness, Goal::Control, Goal::Peace];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Awareness => "Awareness",
            Goal::Control => "Control",
            Goal::Peace => "Peace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == value)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user record
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user identifier
    pub id: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password_hash: String,
    /// The single refresh token currently issued to this user
    pub refresh_token: Option<String>,
    pub monthly_income: Option<f64>,
    pub goal: Option<Goal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with no active session
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            refresh_token: None,
            monthly_income: None,
            goal: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a refresh token is currently stored
    pub fn is_logged_in(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// User fields that may leave the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub monthly_income: Option<f64>,
    pub goal: Option<Goal>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            monthly_income: user.monthly_income,
            goal: user.goal,
        }
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        user.clone().into()
    }
}

/// Signup payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignupRequest {
    /// Trim identifiers and check required fields
    pub fn validate(mut self) -> Result<Self> {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();

        let mut errors = Vec::new();
        if self.username.is_empty() {
            errors.push("username is required".to_string());
        }
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.push("password is required".to_string());
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(mut self) -> Result<Self> {
        self.email = self.email.trim().to_string();

        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.push("password is required".to_string());
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    /// Kept as text so an unknown goal is a validation error, not a decode failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// Validated form of [`UpdateProfileRequest`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfileUpdate {
    pub monthly_income: Option<f64>,
    pub goal: Option<Goal>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<ProfileUpdate> {
        let mut errors = Vec::new();

        if let Some(income) = self.monthly_income {
            if !income.is_finite() || income < 0.0 {
                errors.push("monthly_income cannot be negative".to_string());
            }
        }

        let goal = match self.goal.as_deref() {
            None => None,
            Some(value) => {
                let goal = Goal::parse(value);
                if goal.is_none() {
                    errors.push("goal is not one of Awareness, Control, Peace".to_string());
                }
                goal
            }
        };

        if errors.is_empty() {
            Ok(ProfileUpdate {
                monthly_income: self.monthly_income,
                goal,
            })
        } else {
            Err(Error::Validation(errors))
        }
    }
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    if email.is_empty() {
        errors.push("email is required".to_string());
        return;
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        errors.push("email is not a valid address".to_string());
    }
}

/// Login and refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_parse_round_trip() {
        for goal in Goal::ALL {
            assert_eq!(Goal::parse(goal.as_str()), Some(goal));
        }
        assert_eq!(Goal::parse("control"), None);
    }

    #[test]
    fn test_public_user_hides_secrets() {
        let mut user = User::new("ana".into(), "ana@x.com".into(), "$2b$hash".into());
        user.refresh_token = Some("token".into());

        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert_eq!(json["username"], "ana");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());
    }

    #[test]
    fn test_signup_validation_trims_and_requires() {
        let req = SignupRequest {
            username: "  ana ".into(),
            email: " ana@x.com ".into(),
            password: "secret1".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(req.username, "ana");
        assert_eq!(req.email, "ana@x.com");

        let err = SignupRequest {
            username: "".into(),
            email: "not-an-email".into(),
            password: "".into(),
        }
        .validate()
        .unwrap_err();
        match err {
            Error::Validation(details) => assert_eq!(details.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_profile_update_rejects_negative_income_and_unknown_goal() {
        let err = UpdateProfileRequest {
            monthly_income: Some(-1.0),
            goal: Some("Wealth".into()),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref d) if d.len() == 2));
    }

    #[test]
    fn test_profile_update_partial() {
        let update = UpdateProfileRequest {
            monthly_income: None,
            goal: Some("Peace".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(update.monthly_income, None);
        assert_eq!(update.goal, Some(Goal::Peace));
    }
}
