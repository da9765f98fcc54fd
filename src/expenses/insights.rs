//! Dashboard aggregates over a user's expenses

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::models::{Expense, Mood};

/// Spending pace, regret categories and mood counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub expense_count: usize,
    pub total_spent: f64,
    /// Share of monthly income spent, capped at 100
    pub spending_percentage: f64,
    /// Category -> number of expenses tagged Regret
    pub regret_categories: BTreeMap<String, usize>,
    /// Mood -> number of expenses
    pub mood_counts: BTreeMap<Mood, usize>,
}

impl Insights {
    /// Aggregate `expenses` against `monthly_income`.
    /// Without a positive income the total is compared against 1.
    pub fn compute(expenses: &[Expense], monthly_income: Option<f64>) -> Self {
        let total_spent: f64 = expenses.iter().map(|e| e.amount).sum();

        let income = monthly_income.filter(|i| *i > 0.0).unwrap_or(1.0);
        let spending_percentage = (total_spent / income * 100.0).min(100.0);

        let mut regret_categories = BTreeMap::new();
        let mut mood_counts = BTreeMap::new();
        for expense in expenses {
            *mood_counts.entry(expense.mood).or_insert(0) += 1;
            if expense.mood == Mood::Regret {
                *regret_categories.entry(expense.category.clone()).or_insert(0) += 1;
            }
        }

        Self {
            expense_count: expenses.len(),
            total_spent,
            spending_percentage,
            regret_categories,
            mood_counts,
        }
    }

    /// Category with the most regretted purchases, if any
    pub fn top_regret_category(&self) -> Option<&str> {
        self.regret_categories
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(category, _)| category.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expenses::models::NewExpense;

    fn expense(amount: f64, category: &str, mood: Mood) -> Expense {
        Expense::new(
            "user-1",
            NewExpense {
                amount,
                category: category.to_string(),
                description: String::new(),
                mood,
                date: None,
            },
        )
    }

    #[test]
    fn test_empty() {
        let insights = Insights::compute(&[], Some(5000.0));
        assert_eq!(insights.expense_count, 0);
        assert_eq!(insights.total_spent, 0.0);
        assert_eq!(insights.spending_percentage, 0.0);
        assert!(insights.mood_counts.is_empty());
        assert_eq!(insights.top_regret_category(), None);
    }

    #[test]
    fn test_pace_and_counts() {
        let expenses = vec![
            expense(500.0, "Food", Mood::Regret),
            expense(250.0, "Food", Mood::Regret),
            expense(250.0, "Books", Mood::WorthIt),
            expense(100.0, "Games", Mood::Regret),
        ];
        let insights = Insights::compute(&expenses, Some(5000.0));

        assert_eq!(insights.total_spent, 1100.0);
        assert!((insights.spending_percentage - 22.0).abs() < 1e-9);
        assert_eq!(insights.regret_categories["Food"], 2);
        assert_eq!(insights.regret_categories["Games"], 1);
        assert!(!insights.regret_categories.contains_key("Books"));
        assert_eq!(insights.mood_counts[&Mood::Regret], 3);
        assert_eq!(insights.mood_counts[&Mood::WorthIt], 1);
        assert_eq!(insights.top_regret_category(), Some("Food"));
    }

    #[test]
    fn test_pace_is_capped_without_income() {
        let insights = Insights::compute(&[expense(20.0, "Food", Mood::Neutral)], None);
        assert_eq!(insights.spending_percentage, 100.0);

        let insights = Insights::compute(&[expense(20.0, "Food", Mood::Neutral)], Some(0.0));
        assert_eq!(insights.spending_percentage, 100.0);
    }

    #[test]
    fn test_mood_keys_serialize_as_names() {
        let insights = Insights::compute(&[expense(5.0, "Food", Mood::WorthIt)], None);
        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json["mood_counts"]["Worth It"], 1);
    }
}
