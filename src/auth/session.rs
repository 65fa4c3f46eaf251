use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

use crate::extractors::CurrentUser;

/// Create a new session for a user. Returns the session token.
///
/// Expired sessions of every user are purged on the way, so the table only
/// holds live logins.
pub fn create_session(conn: &Connection, user_id: i64, hours: u64) -> rusqlite::Result<String> {
    let purged = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )?;
    if purged > 0 {
        tracing::debug!(purged, "Removed expired sessions");
    }

    let token = generate_token();

    conn.execute(
        "INSERT INTO sessions (user_id, token, expires_at) VALUES (?1, ?2, datetime('now', ?3))",
        params![user_id, token, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Delete a session by token.
pub fn delete_session(conn: &Connection, token: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Resolve a token to its user. Unknown, expired, or dangling sessions are `None`.
pub fn user_for_token(conn: &Connection, token: &str) -> rusqlite::Result<Option<CurrentUser>> {
    conn.query_row(
        "SELECT u.id, u.name, u.avatar_path FROM sessions s \
         JOIN users u ON u.id = s.user_id \
         WHERE s.token = ?1 AND s.expires_at > datetime('now')",
        params![token],
        |row| {
            Ok(CurrentUser {
                id: row.get(0)?,
                name: row.get(1)?,
                avatar_path: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
