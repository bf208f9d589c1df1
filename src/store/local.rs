use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::auth::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::models::transaction::sort_newest_first;
use crate::models::user::normalize_email;
use crate::models::{Budget, Category, NewCategory, NewTransaction, Transaction, User};
use crate::store::{
    duplicate_category, duplicate_user, ensure_immutable_fields, invalid_credentials, new_id,
    timestamp_now, Store,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocalUser {
    id: String,
    email: String,
    password_hash: String,
    created_at: String,
}

/// The whole local database: one document mirroring the relational tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LocalData {
    #[serde(default)]
    users: Vec<LocalUser>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    budgets: Vec<Budget>,
}

/// Backend keeping every record in memory, optionally mirrored to a JSON file
/// that is rewritten after each mutation.
pub struct LocalStore {
    path: Option<PathBuf>,
    data: Mutex<LocalData>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(LocalData::default()),
        }
    }

    /// Load the document at `path`, starting empty when it does not exist yet.
    pub fn open(path: &Path) -> AppResult<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(path)?;
            if content.trim().is_empty() {
                LocalData::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            LocalData::default()
        };

        debug!(
            path = %path.display(),
            transactions = data.transactions.len(),
            "Opened local store"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            data: Mutex::new(data),
        })
    }

    fn lock(&self) -> MutexGuard<'_, LocalData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read<T>(&self, f: impl FnOnce(&LocalData) -> T) -> T {
        f(&self.lock())
    }

    /// Apply a mutation to a copy of the document, persist the copy, then swap it in.
    /// If `f` or the disk write fails, the current state stays as it was.
    fn write<T>(&self, f: impl FnOnce(&mut LocalData) -> AppResult<T>) -> AppResult<T> {
        let mut data = self.lock();
        let mut next = data.clone();
        let result = f(&mut next)?;
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_vec_pretty(&next)?)?;
        }
        *data = next;
        Ok(result)
    }
}

impl Store for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn sign_up(&self, email: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)?;
        self.write(|data| {
            if data.users.iter().any(|u| u.email == email) {
                return Err(duplicate_user());
            }
            let user = LocalUser {
                id: new_id(),
                email,
                password_hash,
                created_at: timestamp_now(),
            };
            debug!(user_id = %user.id, "Created user");
            let result = User {
                id: user.id.clone(),
                email: user.email.clone(),
            };
            data.users.push(user);
            Ok(result)
        })
    }

    fn sign_in(&self, email: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);
        let stored = self
            .read(|data| data.users.iter().find(|u| u.email == email).cloned())
            .ok_or_else(invalid_credentials)?;
        if !verify_password(password, &stored.password_hash) {
            return Err(invalid_credentials());
        }
        Ok(User {
            id: stored.id,
            email: stored.email,
        })
    }

    fn list_transactions(&self, user_id: &str) -> AppResult<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = self.read(|data| {
            data.transactions
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect()
        });
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    fn add_transaction(&self, user_id: &str, data: NewTransaction) -> AppResult<Transaction> {
        let transaction = data.into_transaction(new_id(), user_id.to_string(), timestamp_now());
        self.write(|store| {
            store.transactions.push(transaction.clone());
            Ok(())
        })?;
        debug!(transaction_id = %transaction.id, user_id, "Created transaction");
        Ok(transaction)
    }

    fn update_transaction(&self, transaction: Transaction) -> AppResult<Transaction> {
        self.write(|store| {
            let existing = store
                .transactions
                .iter_mut()
                .find(|t| t.id == transaction.id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Transaction {} not found", transaction.id))
                })?;
            ensure_immutable_fields(existing, &transaction)?;
            *existing = transaction.clone();
            Ok(())
        })?;
        debug!(transaction_id = %transaction.id, "Updated transaction");
        Ok(transaction)
    }

    fn delete_transaction(&self, id: &str) -> AppResult<()> {
        self.write(|store| {
            let before = store.transactions.len();
            store.transactions.retain(|t| t.id != id);
            if store.transactions.len() < before {
                debug!(transaction_id = id, "Deleted transaction");
            }
            Ok(())
        })
    }

    fn list_custom_categories(&self, user_id: &str) -> AppResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.read(|data| {
            data.categories
                .iter()
                .filter(|c| c.is_custom && c.user_id.as_deref() == Some(user_id))
                .cloned()
                .collect()
        });
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn add_custom_category(&self, user_id: &str, data: NewCategory) -> AppResult<Category> {
        let category = data.into_category(new_id(), user_id.to_string());
        self.write(|store| {
            let taken = store
                .categories
                .iter()
                .any(|c| c.user_id.as_deref() == Some(user_id) && c.name == category.name);
            if taken {
                return Err(duplicate_category(&category.name));
            }
            store.categories.push(category.clone());
            Ok(())
        })?;
        debug!(category_id = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    fn delete_custom_category(&self, id: &str) -> AppResult<()> {
        self.write(|store| {
            store.categories.retain(|c| c.id != id);
            Ok(())
        })
    }

    fn list_budgets(&self, user_id: &str) -> AppResult<Vec<Budget>> {
        let mut budgets: Vec<Budget> = self.read(|data| {
            data.budgets
                .iter()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect()
        });
        budgets.sort_by(|a, b| a.category_name.cmp(&b.category_name));
        Ok(budgets)
    }

    fn upsert_budget(&self, user_id: &str, category_name: &str, amount: f64) -> AppResult<()> {
        self.write(|store| {
            match store
                .budgets
                .iter_mut()
                .find(|b| b.user_id == user_id && b.category_name == category_name)
            {
                Some(existing) => existing.amount = amount,
                None => store.budgets.push(Budget {
                    id: new_id(),
                    user_id: user_id.to_string(),
                    category_name: category_name.to_string(),
                    amount,
                }),
            }
            Ok(())
        })?;
        debug!(user_id, category = category_name, amount, "Upserted budget");
        Ok(())
    }
}
