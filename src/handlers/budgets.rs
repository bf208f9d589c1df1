use axum::extract::State;
use axum::response::Json;
use axum::Extension;
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::{required_text, today, validate_amount};
use crate::models::{Budget, BudgetUpsert, User};
use crate::services::analytics::{budget_progress, compute_totals, BudgetProgress};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BudgetsView {
    pub budgets: Vec<Budget>,
    /// Spending against each budget in the current month.
    pub progress: Vec<BudgetProgress>,
}

fn budgets_view(state: &AppState, user: &User) -> AppResult<BudgetsView> {
    let budgets = state.store.list_budgets(&user.id)?;
    let transactions = state.store.list_transactions(&user.id)?;
    let totals = compute_totals(&transactions, today());
    let progress = budget_progress(&budgets, &totals.monthly_category_totals);
    Ok(BudgetsView { budgets, progress })
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<BudgetsView>> {
    Ok(Json(budgets_view(&state, &user)?))
}

/// Set the monthly limit for a category, creating the budget if needed.
pub async fn upsert(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(data): Json<BudgetUpsert>,
) -> AppResult<Json<BudgetsView>> {
    let category_name = required_text(&data.category_name, "Category")?;
    validate_amount(data.amount, "Budget amount")?;

    state
        .store
        .upsert_budget(&user.id, &category_name, data.amount)?;

    Ok(Json(budgets_view(&state, &user)?))
}
