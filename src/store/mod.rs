//! The persistence gateway: one contract, two interchangeable backends.
//!
//! [`SqliteStore`] is the relational backend (the `transactions`, `categories`
//! and `budgets` tables); [`LocalStore`] keeps the same records in a single
//! JSON document. Both hand out identical record shapes, so aggregation never
//! needs to know which one is in use.

pub mod local;
pub mod sqlite;

pub use local::LocalStore;
pub use sqlite::SqliteStore;

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Budget, Category, NewCategory, NewTransaction, Transaction, User};

pub trait Store: Send + Sync {
    /// Short backend name for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Register a new account. A taken email is a [`AppError::Conflict`].
    fn sign_up(&self, email: &str, password: &str) -> AppResult<User>;

    /// Check credentials. Unknown email or wrong password is [`AppError::Auth`].
    fn sign_in(&self, email: &str, password: &str) -> AppResult<User>;

    /// The user's transactions, newest `date` first.
    fn list_transactions(&self, user_id: &str) -> AppResult<Vec<Transaction>>;

    /// Store a new transaction; the id and `created_at` are assigned here.
    fn add_transaction(&self, user_id: &str, data: NewTransaction) -> AppResult<Transaction>;

    /// Replace the mutable fields of an existing transaction. Changing the
    /// owner or creation time is rejected.
    fn update_transaction(&self, transaction: Transaction) -> AppResult<Transaction>;

    /// Remove a transaction. Unknown ids are not an error.
    fn delete_transaction(&self, id: &str) -> AppResult<()>;

    /// The user's own categories; built-ins are never returned here.
    fn list_custom_categories(&self, user_id: &str) -> AppResult<Vec<Category>>;

    /// Create a custom category. A duplicate name for the user is a [`AppError::Conflict`].
    fn add_custom_category(&self, user_id: &str, data: NewCategory) -> AppResult<Category>;

    /// Remove a custom category. Transactions using its name are not touched.
    fn delete_custom_category(&self, id: &str) -> AppResult<()>;

    fn list_budgets(&self, user_id: &str) -> AppResult<Vec<Budget>>;

    /// Set the monthly limit for a category, creating the budget on first use.
    fn upsert_budget(&self, user_id: &str, category_name: &str, amount: f64) -> AppResult<()>;
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Reject updates that try to move a transaction to another owner or rewrite its history.
pub(crate) fn ensure_immutable_fields(existing: &Transaction, updated: &Transaction) -> AppResult<()> {
    if existing.user_id != updated.user_id {
        return Err(AppError::Validation(
            "Transaction owner cannot be changed".into(),
        ));
    }
    if existing.created_at != updated.created_at {
        return Err(AppError::Validation(
            "Transaction creation time cannot be changed".into(),
        ));
    }
    Ok(())
}

pub(crate) fn duplicate_category(name: &str) -> AppError {
    AppError::Conflict(format!("Category '{}' already exists", name))
}

pub(crate) fn duplicate_user() -> AppError {
    AppError::Conflict("User already exists".into())
}

pub(crate) fn invalid_credentials() -> AppError {
    AppError::Auth("Invalid credentials".into())
}
