use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config::Settings;

/// Open (creating if necessary) the configured database file and make sure both
/// tables exist. The returned connection lives for the rest of the process and
/// is handed to every record operation by reference.
pub fn open_database(settings: &Settings) -> Result<Connection> {
    let db_path = settings.database_path();

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(&db_path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;

    tracing::info!(
        path = %db_path.display(),
        host = %settings.host,
        user = %settings.user,
        "database ready"
    );
    Ok(conn)
}

/// Create the `Library` and `Students` tables if they are absent. Running this
/// against an existing database leaves its rows untouched.
///
/// `Library.CARD_ID` has no foreign key to `Students`: it holds "N/A" for
/// shelved books, and deleting a student with books out is not guarded.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS Library (
            BK_NAME TEXT NOT NULL,
            BK_ID TEXT NOT NULL PRIMARY KEY,
            AUTHOR_NAME TEXT NOT NULL,
            GENRE TEXT NOT NULL,
            BK_STATUS TEXT NOT NULL,
            CARD_ID TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create Library table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Students (
            Card_ID TEXT NOT NULL PRIMARY KEY,
            Name TEXT NOT NULL,
            Email TEXT NOT NULL,
            Course TEXT NOT NULL,
            Year INTEGER NOT NULL
        )",
        [],
    )
    .context("failed to create Students table")?;

    Ok(())
}
