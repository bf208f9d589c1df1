use crate::db::queries::kind_column;
use crate::models::category::Category;
use rusqlite::{params, Connection, Row};
use tracing::debug;

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        kind: kind_column(row, 3)?,
        color: row.get(4)?,
        is_custom: row.get(5)?,
    })
}

pub fn list_custom_categories(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, type, color, is_custom
         FROM categories
         WHERE user_id = ? AND is_custom = 1
         ORDER BY name",
    )?;

    let categories = stmt
        .query_map([user_id], row_to_category)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

pub fn insert_category(conn: &Connection, category: &Category) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO categories (id, user_id, name, type, color, is_custom)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            category.id,
            category.user_id,
            category.name,
            category.kind.as_str(),
            category.color,
            category.is_custom,
        ],
    )?;
    debug!(category_id = %category.id, name = %category.name, "Created category");
    Ok(())
}

/// Transactions tagged with the category's name are left untouched.
pub fn delete_category(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM categories WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(category_id = id, "Deleted category");
    }
    Ok(rows > 0)
}
