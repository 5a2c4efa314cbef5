use anyhow::{Error, Result};
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

/// Open (or create) the sqlite database at `path`.
pub async fn async_db(path: &str) -> Result<Connection, Error> {
    let db = Connection::open(path).await?;
    db.call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    })
    .await?;
    Ok(db)
}

/// Creates every table and index. Safe to run on an existing db.
pub fn initialize_db(conn: &SyncConnection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        BEGIN;

        CREATE TABLE IF NOT EXISTS user_profile (
            uid TEXT PRIMARY KEY,
            name TEXT,
            email TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS session (
            uid TEXT NOT NULL,
            id TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'chat',
            title TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (uid, id)
        );

        CREATE INDEX IF NOT EXISTS session_uid_kind_created_at
        ON session (uid, kind, created_at);

        CREATE TABLE IF NOT EXISTS turn (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL,
            session_id TEXT NOT NULL,
            user_input TEXT,
            reply TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            FOREIGN KEY (uid, session_id) REFERENCES session (uid, id)
        );

        CREATE INDEX IF NOT EXISTS turn_session_created_at
        ON turn (uid, session_id, created_at, id);

        CREATE TABLE IF NOT EXISTS media_call (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            uid TEXT,
            input TEXT NOT NULL,
            output TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        COMMIT;
        "#,
    )
}

/// In-memory database with the schema applied.
#[cfg(test)]
pub(crate) async fn memory_db() -> Result<Connection, Error> {
    let db = Connection::open_in_memory().await?;
    db.call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}
