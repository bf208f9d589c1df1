use crate::auth::{hash_password, verify_password};
use crate::db::queries::{budgets, categories, transactions, users};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::user::normalize_email;
use crate::models::{Budget, Category, NewCategory, NewTransaction, Transaction, User};
use crate::store::{
    duplicate_category, duplicate_user, ensure_immutable_fields, invalid_credentials, new_id,
    timestamp_now, Store,
};

/// Relational backend over an SQLite connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn sign_up(&self, email: &str, password: &str) -> AppResult<User> {
        let conn = self.pool.get()?;
        let email = normalize_email(email);
        if users::find_by_email(&conn, &email)?.is_some() {
            return Err(duplicate_user());
        }

        let user = User {
            id: new_id(),
            email,
        };
        let password_hash = hash_password(password)?;
        users::insert_user(&conn, &user, &password_hash, &timestamp_now()).map_err(|e| {
            match AppError::from(e) {
                AppError::Conflict(_) => duplicate_user(),
                other => other,
            }
        })?;
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> AppResult<User> {
        let conn = self.pool.get()?;
        let stored = users::find_by_email(&conn, &normalize_email(email))?
            .ok_or_else(invalid_credentials)?;
        if !verify_password(password, &stored.password_hash) {
            return Err(invalid_credentials());
        }
        Ok(stored.user)
    }

    fn list_transactions(&self, user_id: &str) -> AppResult<Vec<Transaction>> {
        let conn = self.pool.get()?;
        Ok(transactions::list_transactions(&conn, user_id)?)
    }

    fn add_transaction(&self, user_id: &str, data: NewTransaction) -> AppResult<Transaction> {
        let conn = self.pool.get()?;
        let transaction = data.into_transaction(new_id(), user_id.to_string(), timestamp_now());
        transactions::insert_transaction(&conn, &transaction)?;
        Ok(transaction)
    }

    fn update_transaction(&self, transaction: Transaction) -> AppResult<Transaction> {
        let conn = self.pool.get()?;
        let existing = transactions::get_transaction(&conn, &transaction.id)?.ok_or_else(|| {
            AppError::NotFound(format!("Transaction {} not found", transaction.id))
        })?;
        ensure_immutable_fields(&existing, &transaction)?;
        transactions::update_transaction(&conn, &transaction)?;
        Ok(transaction)
    }

    fn delete_transaction(&self, id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        transactions::delete_transaction(&conn, id)?;
        Ok(())
    }

    fn list_custom_categories(&self, user_id: &str) -> AppResult<Vec<Category>> {
        let conn = self.pool.get()?;
        Ok(categories::list_custom_categories(&conn, user_id)?)
    }

    fn add_custom_category(&self, user_id: &str, data: NewCategory) -> AppResult<Category> {
        let conn = self.pool.get()?;
        let category = data.into_category(new_id(), user_id.to_string());
        categories::insert_category(&conn, &category).map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => duplicate_category(&category.name),
            other => other,
        })?;
        Ok(category)
    }

    fn delete_custom_category(&self, id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        categories::delete_category(&conn, id)?;
        Ok(())
    }

    fn list_budgets(&self, user_id: &str) -> AppResult<Vec<Budget>> {
        let conn = self.pool.get()?;
        Ok(budgets::list_budgets(&conn, user_id)?)
    }

    fn upsert_budget(&self, user_id: &str, category_name: &str, amount: f64) -> AppResult<()> {
        let conn = self.pool.get()?;
        budgets::upsert_budget(&conn, &new_id(), user_id, category_name, amount)?;
        Ok(())
    }
}
