pub mod auth;
pub mod budgets;
pub mod categories;
pub mod dashboard;
pub mod insights;
pub mod transactions;

use axum::extract::State;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::VERSION;

/// Routes reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/me", get(auth::me))
        // Health check
        .route("/health", get(health))
}

/// Data routes; the caller wraps these in the session middleware.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Transactions
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/transactions/export.csv", get(transactions::export))
        .route("/api/transactions/:id", put(transactions::update))
        .route("/api/transactions/:id", delete(transactions::delete))
        // Categories
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route("/api/categories/:id", delete(categories::delete))
        // Budgets
        .route("/api/budgets", get(budgets::list).put(budgets::upsert))
        // Views
        .route("/api/dashboard", get(dashboard::show))
        .route("/api/insights", post(insights::generate))
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub backend: &'static str,
    pub version: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        backend: state.store.backend_name(),
        version: VERSION,
    })
}

pub async fn fallback() -> AppError {
    AppError::NotFound("No such route".into())
}

/// The calendar date all "this month" figures are computed against.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Money amounts must be finite and non-negative; the transaction type carries the sign.
pub fn validate_amount(amount: f64, what: &str) -> AppResult<()> {
    if !amount.is_finite() {
        return Err(AppError::Validation(format!("{what} must be a number")));
    }
    if amount < 0.0 {
        return Err(AppError::Validation(format!("{what} cannot be negative")));
    }
    Ok(())
}

/// Trimmed, non-empty text field.
pub fn required_text(value: &str, what: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{what} is required")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.0, "Amount").is_ok());
        assert!(validate_amount(12.5, "Amount").is_ok());
        assert!(matches!(
            validate_amount(-1.0, "Amount"),
            Err(AppError::Validation(_))
        ));
        assert!(validate_amount(f64::NAN, "Amount").is_err());
        assert!(validate_amount(f64::INFINITY, "Amount").is_err());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  Food ", "Category").unwrap(), "Food");
        assert!(required_text("   ", "Category").is_err());
    }
}
