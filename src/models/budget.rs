use serde::{Deserialize, Serialize};

/// Monthly spending limit for one expense category. At most one per user and category name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category_name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetUpsert {
    pub category_name: String,
    pub amount: f64,
}
