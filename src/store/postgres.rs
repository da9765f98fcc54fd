//! PostgreSQL store

use async_trait::async_trait;
use chrono::Utc;
use tokio_postgres::{Client, NoTls, Row};

use super::{ExpenseStore, UserStore};
use crate::auth::models::{Goal, ProfileUpdate, User};
use crate::error::{Error, Result};
use crate::expenses::{Expense, Mood};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              TEXT PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,
    refresh_token   TEXT,
    monthly_income  DOUBLE PRECISION CHECK (monthly_income >= 0),
    goal            TEXT,
    created_at      TIMESTAMPTZ NOT NULL,
    updated_at      TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
    id           TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(id),
    amount       DOUBLE PRECISION NOT NULL CHECK (amount > 0),
    category     TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    mood         TEXT NOT NULL,
    date         TIMESTAMPTZ NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS expenses_user_date ON expenses (user_id, date DESC);
"#;

const USER_COLUMNS: &str = "id, username, email, password_hash, refresh_token, \
                            monthly_income, goal, created_at, updated_at";

const EXPENSE_COLUMNS: &str = "id, user_id, amount, category, description, mood, date, created_at";

/// Store backed by a single multiplexed PostgreSQL connection
pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connect and create the tables if they do not exist yet
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        client.batch_execute(SCHEMA).await?;
        tracing::debug!("Database schema ready");

        Ok(Self { client })
    }
}

fn user_from_row(row: &Row) -> Result<User> {
    let goal: Option<String> = row.try_get("goal")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        refresh_token: row.try_get("refresh_token")?,
        monthly_income: row.try_get("monthly_income")?,
        goal: goal.as_deref().and_then(Goal::parse),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn expense_from_row(row: &Row) -> Result<Expense> {
    let mood: String = row.try_get("mood")?;
    let mood = Mood::parse(&mood)
        .ok_or_else(|| Error::Other(format!("Unknown mood in database: {}", mood)))?;
    Ok(Expense {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        amount: row.try_get("amount")?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
        mood,
        date: row.try_get("date")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn create_user(&self, user: User) -> Result<User> {
        let goal = user.goal.map(|g| g.as_str());
        let inserted = self
            .client
            .execute(
                "INSERT INTO users (id, username, email, password_hash, refresh_token, \
                 monthly_income, goal, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT DO NOTHING",
                &[
                    &user.id,
                    &user.username,
                    &user.email,
                    &user.password_hash,
                    &user.refresh_token,
                    &user.monthly_income,
                    &goal,
                    &user.created_at,
                    &user.updated_at,
                ],
            )
            .await?;

        if inserted == 0 {
            return Err(Error::Conflict("Email or username already exists.".to_string()));
        }
        Ok(user)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        self.client
            .query_opt(&query, &[&id])
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        self.client
            .query_opt(&query, &[&email])
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<bool> {
        let updated = self
            .client
            .execute(
                "UPDATE users SET refresh_token = $2, updated_at = $3 WHERE id = $1",
                &[&id, &token, &Utc::now()],
            )
            .await?;
        Ok(updated == 1)
    }

    async fn swap_refresh_token(
        &self,
        id: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<bool> {
        let updated = self
            .client
            .execute(
                "UPDATE users SET refresh_token = $3, updated_at = $4 \
                 WHERE id = $1 AND refresh_token IS NOT DISTINCT FROM $2::TEXT",
                &[&id, &expected, &new, &Utc::now()],
            )
            .await?;
        Ok(updated == 1)
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        let goal = update.goal.map(|g| g.as_str());
        let query = format!(
            "UPDATE users SET \
             monthly_income = COALESCE($2::DOUBLE PRECISION, monthly_income), \
             goal = COALESCE($3::TEXT, goal), \
             updated_at = $4 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        self.client
            .query_opt(&query, &[&id, &update.monthly_income, &goal, &Utc::now()])
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }
}

#[async_trait]
impl ExpenseStore for PostgresStore {
    async fn create_expense(&self, expense: Expense) -> Result<Expense> {
        self.client
            .execute(
                "INSERT INTO expenses (id, user_id, amount, category, description, mood, date, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &expense.id,
                    &expense.user_id,
                    &expense.amount,
                    &expense.category,
                    &expense.description,
                    &expense.mood.as_str(),
                    &expense.date,
                    &expense.created_at,
                ],
            )
            .await?;
        Ok(expense)
    }

    async fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>> {
        let query = format!(
            "SELECT {} FROM expenses WHERE user_id = $1 ORDER BY date DESC, created_at DESC",
            EXPENSE_COLUMNS
        );
        self.client
            .query(&query, &[&user_id])
            .await?
            .iter()
            .map(expense_from_row)
            .collect()
    }

    async fn delete_expense(&self, user_id: &str, id: &str) -> Result<bool> {
        let deleted = self
            .client
            .execute(
                "DELETE FROM expenses WHERE id = $1 AND user_id = $2",
                &[&id, &user_id],
            )
            .await?;
        Ok(deleted == 1)
    }
}
