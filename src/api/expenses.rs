//! Expense route handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::routes::json_body;
use super::server::AppState;
use crate::auth::AuthUser;
use crate::error::{Error, Result};
use crate::expenses::{CreateExpenseRequest, Expense, Insights};
use crate::store::ExpenseStore;

pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let new = json_body(payload)?.validate()?;
    let expense = state
        .store
        .create_expense(Expense::new(user.id(), new))
        .await?;

    tracing::info!(user_id = %user.id(), "Expense created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "expense": expense })),
    ))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let expenses = state.store.list_expenses(user.id()).await?;
    Ok(Json(json!({ "status": "success", "expenses": expenses })))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    if !state.store.delete_expense(user.id(), &id).await? {
        return Err(Error::not_found("Expense not found"));
    }

    tracing::info!(user_id = %user.id(), expense_id = %id, "Expense deleted");
    Ok(Json(json!({
        "status": "success",
        "message": "Expense deleted successfully",
    })))
}

pub async fn insights(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let expenses = state.store.list_expenses(user.id()).await?;
    let insights = Insights::compute(&expenses, user.0.monthly_income);
    Ok(Json(json!({ "status": "success", "insights": insights })))
}
