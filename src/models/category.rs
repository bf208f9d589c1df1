use serde::{Deserialize, Serialize};

use crate::models::TransactionType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    /// `None` for built-in categories, which belong to no user.
    pub user_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub color: String,
    pub is_custom: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default = "default_color")]
    pub color: String,
}

impl NewCategory {
    pub fn into_category(self, id: String, user_id: String) -> Category {
        Category {
            id,
            user_id: Some(user_id),
            name: self.name,
            kind: self.kind,
            color: self.color,
            is_custom: true,
        }
    }
}

fn default_color() -> String {
    crate::services::categories::FALLBACK_COLOR.to_string()
}
