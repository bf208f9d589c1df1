pub mod budgets;
pub mod categories;
pub mod transactions;
pub mod users;

use crate::models::TransactionType;
use rusqlite::types::Type;
use rusqlite::Row;

/// Read an `income`/`expense` column. Any other value is a conversion error.
pub(crate) fn kind_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<TransactionType> {
    let kind: String = row.get(idx)?;
    kind.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown transaction type '{kind}'").into(),
        )
    })
}
