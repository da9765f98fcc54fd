//! In-memory store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ExpenseStore, UserStore};
use crate::auth::models::{ProfileUpdate, User};
use crate::error::{Error, Result};
use crate::expenses::Expense;

#[derive(Default)]
struct Data {
    users: HashMap<String, User>,
    expenses: HashMap<String, Expense>,
}

/// Process-local store for development and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Data>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.data.read().await.users.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User> {
        let mut data = self.data.write().await;

        let taken = data
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(Error::Conflict("Email or username already exists.".to_string()));
        }

        data.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.data.read().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .data
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<bool> {
        let mut data = self.data.write().await;
        match data.users.get_mut(id) {
            Some(user) => {
                user.refresh_token = token.map(str::to_string);
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn swap_refresh_token(
        &self,
        id: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<bool> {
        let mut data = self.data.write().await;
        match data.users.get_mut(id) {
            Some(user) if user.refresh_token.as_deref() == expected => {
                user.refresh_token = new.map(str::to_string);
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut data = self.data.write().await;
        let Some(user) = data.users.get_mut(id) else {
            return Ok(None);
        };

        if let Some(income) = update.monthly_income {
            user.monthly_income = Some(income);
        }
        if let Some(goal) = update.goal {
            user.goal = Some(goal);
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn create_expense(&self, expense: Expense) -> Result<Expense> {
        self.data
            .write()
            .await
            .expenses
            .insert(expense.id.clone(), expense.clone());
        Ok(expense)
    }

    async fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>> {
        let data = self.data.read().await;
        let mut expenses: Vec<Expense> = data
            .expenses
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    async fn delete_expense(&self, user_id: &str, id: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let owned = data
            .expenses
            .get(id)
            .is_some_and(|e| e.user_id == user_id);
        if owned {
            data.expenses.remove(id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Goal;
    use crate::expenses::{Mood, NewExpense};

    fn user(name: &str) -> User {
        User::new(name.to_string(), format!("{name}@x.com"), "hash".to_string())
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(user("ana")).await.unwrap();

        let same_name = User::new("ana".into(), "other@x.com".into(), "hash".into());
        assert!(matches!(store.create_user(same_name).await, Err(Error::Conflict(_))));

        let same_email = User::new("other".into(), "ana@x.com".into(), "hash".into());
        assert!(matches!(store.create_user(same_email).await, Err(Error::Conflict(_))));

        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_swap_refresh_token_only_when_expected_matches() {
        let store = MemoryStore::new();
        let ana = store.create_user(user("ana")).await.unwrap();

        assert!(store.set_refresh_token(&ana.id, Some("first")).await.unwrap());
        assert!(!store
            .swap_refresh_token(&ana.id, Some("stale"), None)
            .await
            .unwrap());
        assert!(store
            .swap_refresh_token(&ana.id, Some("first"), None)
            .await
            .unwrap());

        let stored = store.find_user_by_id(&ana.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token, None);
    }

    #[tokio::test]
    async fn test_update_profile_is_partial() {
        let store = MemoryStore::new();
        let ana = store.create_user(user("ana")).await.unwrap();

        let update = ProfileUpdate { monthly_income: Some(5000.0), goal: None };
        store.update_profile(&ana.id, &update).await.unwrap();
        let update = ProfileUpdate { monthly_income: None, goal: Some(Goal::Control) };
        let updated = store.update_profile(&ana.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.monthly_income, Some(5000.0));
        assert_eq!(updated.goal, Some(Goal::Control));
        assert!(store.update_profile("missing", &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expenses_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let new = NewExpense {
            amount: 10.0,
            category: "Food".into(),
            description: String::new(),
            mood: Mood::Neutral,
            date: None,
        };
        let expense = store
            .create_expense(Expense::new("ana", new))
            .await
            .unwrap();

        assert!(store.list_expenses("bob").await.unwrap().is_empty());
        assert!(!store.delete_expense("bob", &expense.id).await.unwrap());
        assert!(store.delete_expense("ana", &expense.id).await.unwrap());
        assert!(store.list_expenses("ana").await.unwrap().is_empty());
    }
}
