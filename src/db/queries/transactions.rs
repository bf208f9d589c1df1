use crate::db::queries::kind_column;
use crate::models::transaction::Transaction;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, type, amount, category, description, date, created_at";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: kind_column(row, 2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn list_transactions(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRANSACTION_COLUMNS}
         FROM transactions
         WHERE user_id = ?
         ORDER BY date DESC, created_at DESC"
    ))?;

    let transactions = stmt
        .query_map([user_id], row_to_transaction)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(user_id, count = transactions.len(), "Listed transactions");
    Ok(transactions)
}

pub fn get_transaction(conn: &Connection, id: &str) -> rusqlite::Result<Option<Transaction>> {
    trace!(transaction_id = id, "Fetching transaction");
    conn.query_row(
        &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"),
        [id],
        row_to_transaction,
    )
    .optional()
}

pub fn insert_transaction(conn: &Connection, transaction: &Transaction) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, user_id, type, amount, category, description, date, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            transaction.id,
            transaction.user_id,
            transaction.kind.as_str(),
            transaction.amount,
            transaction.category,
            transaction.description,
            transaction.date,
            transaction.created_at,
        ],
    )?;
    debug!(transaction_id = %transaction.id, user_id = %transaction.user_id, "Created transaction");
    Ok(())
}

/// Update the mutable fields of a transaction. Ownership and creation time never change.
pub fn update_transaction(conn: &Connection, transaction: &Transaction) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE transactions SET type = ?, amount = ?, category = ?, description = ?, date = ?
         WHERE id = ? AND user_id = ?",
        params![
            transaction.kind.as_str(),
            transaction.amount,
            transaction.category,
            transaction.description,
            transaction.date,
            transaction.id,
            transaction.user_id,
        ],
    )?;
    if rows > 0 {
        debug!(transaction_id = %transaction.id, "Updated transaction");
    }
    Ok(rows > 0)
}

pub fn delete_transaction(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM transactions WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(transaction_id = id, "Deleted transaction");
    }
    Ok(rows > 0)
}
