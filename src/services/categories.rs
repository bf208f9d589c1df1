//! Built-in category table and name → color resolution.
//!
//! Transactions reference categories by name only, so lookups here never fail:
//! an unknown or deleted category simply resolves to [`FALLBACK_COLOR`].

use crate::models::{Category, TransactionType};

/// Neutral color used for any category name that is not known.
pub const FALLBACK_COLOR: &str = "#64748b";

/// A built-in category. Shared by every user and never persisted.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: TransactionType,
    pub color: &'static str,
}

impl BuiltinCategory {
    pub fn to_category(&self) -> Category {
        Category {
            id: self.id.to_string(),
            user_id: None,
            name: self.name.to_string(),
            kind: self.kind,
            color: self.color.to_string(),
            is_custom: false,
        }
    }
}

pub const BUILTIN_CATEGORIES: &[BuiltinCategory] = &[
    BuiltinCategory {
        id: "cat_salary",
        name: "Salary",
        kind: TransactionType::Income,
        color: "#10b981",
    },
    BuiltinCategory {
        id: "cat_freelance",
        name: "Freelance",
        kind: TransactionType::Income,
        color: "#3b82f6",
    },
    BuiltinCategory {
        id: "cat_food",
        name: "Food",
        kind: TransactionType::Expense,
        color: "#f59e0b",
    },
    BuiltinCategory {
        id: "cat_transport",
        name: "Transport",
        kind: TransactionType::Expense,
        color: "#6366f1",
    },
    BuiltinCategory {
        id: "cat_bills",
        name: "Bills",
        kind: TransactionType::Expense,
        color: "#ef4444",
    },
    BuiltinCategory {
        id: "cat_entertainment",
        name: "Entertainment",
        kind: TransactionType::Expense,
        color: "#ec4899",
    },
    BuiltinCategory {
        id: "cat_healthcare",
        name: "Healthcare",
        kind: TransactionType::Expense,
        color: "#14b8a6",
    },
    BuiltinCategory {
        id: "cat_shopping",
        name: "Shopping",
        kind: TransactionType::Expense,
        color: "#8b5cf6",
    },
    BuiltinCategory {
        id: "cat_other_in",
        name: "Other Income",
        kind: TransactionType::Income,
        color: "#64748b",
    },
    BuiltinCategory {
        id: "cat_other_ex",
        name: "Other Expense",
        kind: TransactionType::Expense,
        color: "#64748b",
    },
];

pub fn find_builtin(name: &str) -> Option<&'static BuiltinCategory> {
    BUILTIN_CATEGORIES.iter().find(|c| c.name == name)
}

pub fn is_builtin_name(name: &str) -> bool {
    find_builtin(name).is_some()
}

/// Resolve a category name to its display color. Built-ins win over custom entries.
pub fn resolve_color<'a>(name: &str, custom: &'a [Category]) -> &'a str {
    if let Some(builtin) = find_builtin(name) {
        return builtin.color;
    }
    custom
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.color.as_str())
        .unwrap_or(FALLBACK_COLOR)
}

/// Built-ins followed by the user's custom categories, optionally restricted to one type.
pub fn all_categories(custom: &[Category], kind: Option<TransactionType>) -> Vec<Category> {
    BUILTIN_CATEGORIES
        .iter()
        .map(BuiltinCategory::to_category)
        .chain(custom.iter().cloned())
        .filter(|c| kind.is_none_or(|k| c.kind == k))
        .collect()
}
