pub mod ai;
pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub use ai::{AiProvider, AiSettings};
pub use budget::{Budget, BudgetUpsert};
pub use category::{Category, NewCategory};
pub use transaction::{NewTransaction, Transaction, TransactionFilter, TransactionType};
pub use user::{Credentials, User};
