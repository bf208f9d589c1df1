use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction of a transaction. The amount itself is never signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    /// Category name. Not a foreign key: deleting the category leaves this untouched.
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub created_at: String,
}

impl Transaction {
    pub fn amount_display(&self) -> String {
        format!("{:.2}", self.amount)
    }
}

/// Fields supplied by the user when recording a transaction; the store assigns the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
}

impl NewTransaction {
    pub fn into_transaction(self, id: String, user_id: String, created_at: String) -> Transaction {
        Transaction {
            id,
            user_id,
            kind: self.kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            created_at,
        }
    }
}

/// List filter for the transactions view and CSV export.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if transaction.kind != kind {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if transaction.category != category {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                transaction.description.to_lowercase().contains(&term)
                    || transaction.category.to_lowercase().contains(&term)
            }
            None => true,
        }
    }

    /// Filter and order newest first (by economic date, then creation time).
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut filtered: Vec<Transaction> = transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        sort_newest_first(&mut filtered);
        filtered
    }
}

pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}
