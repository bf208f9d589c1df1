use std::sync::Arc;

use crate::auth::SessionStore;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{Budget, Category, Transaction};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
}

/// Everything one user owns, loaded in a single pass before recomputing views.
pub struct UserData {
    pub transactions: Vec<Transaction>,
    pub custom_categories: Vec<Category>,
    pub budgets: Vec<Budget>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    /// Fetch transactions, custom categories and budgets for `user_id`.
    pub fn load_user_data(&self, user_id: &str) -> AppResult<UserData> {
        Ok(UserData {
            transactions: self.store.list_transactions(user_id)?,
            custom_categories: self.store.list_custom_categories(user_id)?,
            budgets: self.store.list_budgets(user_id)?,
        })
    }
}
