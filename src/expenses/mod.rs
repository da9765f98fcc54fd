//! Expense journal and insights

pub mod insights;
pub mod models;

pub use insights::Insights;
pub use models::{CreateExpenseRequest, Expense, Mood, NewExpense};
