use crate::models::User;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

/// A user row together with its password hash.
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<StoredUser>> {
    conn.query_row(
        "SELECT id, email, password_hash FROM users WHERE email = ?",
        [email],
        |row| {
            Ok(StoredUser {
                user: User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                },
                password_hash: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn insert_user(
    conn: &Connection,
    user: &User,
    password_hash: &str,
    created_at: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        params![user.id, user.email, password_hash, created_at],
    )?;
    debug!(user_id = %user.id, "Created user");
    Ok(())
}
