use crate::models::Budget;
use rusqlite::{params, Connection};
use tracing::debug;

pub fn list_budgets(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, category_name, amount
         FROM budgets
         WHERE user_id = ?
         ORDER BY category_name",
    )?;

    let budgets = stmt
        .query_map([user_id], |row| {
            Ok(Budget {
                id: row.get(0)?,
                user_id: row.get(1)?,
                category_name: row.get(2)?,
                amount: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(budgets)
}

/// Insert a budget, or update the limit of the existing row for the same category.
/// `id` is only used when a new row is created.
pub fn upsert_budget(
    conn: &Connection,
    id: &str,
    user_id: &str,
    category_name: &str,
    amount: f64,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO budgets (id, user_id, category_name, amount)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id, category_name) DO UPDATE SET amount = excluded.amount",
        params![id, user_id, category_name, amount],
    )?;
    debug!(user_id, category = category_name, amount, "Upserted budget");
    Ok(())
}
