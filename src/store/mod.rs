//! Persistence for users and expenses

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::models::{ProfileUpdate, User};
use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::expenses::Expense;

/// User records, keyed by id with unique username and email
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the username or email is taken.
    async fn create_user(&self, user: User) -> Result<User>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Overwrite the stored refresh token. Returns false if the user does not exist.
    async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<bool>;

    /// Replace the stored refresh token only while it still equals `expected`
    async fn swap_refresh_token(
        &self,
        id: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<bool>;

    /// Apply the supplied profile fields, returning the updated user
    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<User>>;
}

/// Expense records owned by users
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn create_expense(&self, expense: Expense) -> Result<Expense>;

    /// All expenses of a user, newest `date` first
    async fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>>;

    /// Delete an expense only if it belongs to `user_id`
    async fn delete_expense(&self, user_id: &str, id: &str) -> Result<bool>;
}

/// Everything the API needs from a backend
pub trait Store: UserStore + ExpenseStore {}

impl<T: UserStore + ExpenseStore> Store for T {}

pub type SharedStore = Arc<dyn Store>;

/// Open the configured backend: PostgreSQL when a URL is set, memory otherwise
pub async fn open_store(config: &DatabaseConfig) -> Result<SharedStore> {
    match config.url.as_deref() {
        Some(url) => {
            let store = PostgresStore::connect(url).await?;
            tracing::info!("Using PostgreSQL store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No database configured, records are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
