use rusqlite::Connection;

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

/// Run database schema migrations
pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version >= SCHEMA_VERSION {
        tracing::debug!(target: "storage", version, "Schema up to date");
        return Ok(());
    }

    conn.execute_batch(
        "
        -- Key-value table backing every persisted setting and the task list
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        ",
    )?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    tracing::info!(
        target: "storage",
        from = version,
        to = SCHEMA_VERSION,
        "Database schema migrations completed"
    );
    Ok(())
}
