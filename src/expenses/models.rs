//! Expense records and request shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Largest amount accepted for a single expense
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Longest description accepted, in characters
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// How the user feels about a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "Worth It")]
    WorthIt,
    Neutral,
    Regret,
}

impl Mood {
    pub const ALL: [Mood; 3] = [Mood::WorthIt, Mood::Neutral, Mood::Regret];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::WorthIt => "Worth It",
            Mood::Neutral => "Neutral",
            Mood::Regret => "Regret",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub mood: Mood,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(user_id: &str, new: NewExpense) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount: new.amount,
            category: new.category,
            description: new.description,
            mood: new.mood,
            date: new.date.unwrap_or(now),
            created_at: now,
        }
    }
}

/// Expense creation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kept as text so an unknown mood is reported as a validation error
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// Validated form of [`CreateExpenseRequest`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub mood: Mood,
    pub date: Option<DateTime<Utc>>,
}

impl CreateExpenseRequest {
    pub fn validate(self) -> Result<NewExpense> {
        let mut errors = Vec::new();

        let amount = self.amount.unwrap_or(f64::NAN);
        if self.amount.is_none() {
            errors.push("amount is required".to_string());
        } else if !amount.is_finite() || amount <= 0.0 {
            errors.push("amount must be greater than 0".to_string());
        } else if amount > MAX_AMOUNT {
            errors.push("amount seems too large".to_string());
        }

        let category = self.category.trim().to_string();
        if category.is_empty() {
            errors.push("category cannot be empty".to_string());
        }

        let description = self.description.unwrap_or_default().trim().to_string();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push("description is too long".to_string());
        }

        let mood = match self.mood.as_deref() {
            None | Some("") => {
                errors.push("mood is required".to_string());
                None
            }
            Some(value) => {
                let mood = Mood::parse(value);
                if mood.is_none() {
                    errors.push("mood is not one of Worth It, Neutral, Regret".to_string());
                }
                mood
            }
        };

        match (errors.is_empty(), mood) {
            (true, Some(mood)) => Ok(NewExpense {
                amount,
                category,
                description,
                mood,
                date: self.date,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}
