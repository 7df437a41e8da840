// Database layer: SQLite storage for collected stickers.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives in the plugin data directory
// (STICKER_DATA_DIR) under a fixed name.

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteStore;
pub use traits::StickerStore;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// File name of the sticker database inside the data directory.
pub const DB_NAME: &str = "sticker_collector.db";

/// Open (or create) the database and run migrations.
///
/// Schema creation happens here, before any store value exists, so no query
/// can ever observe a missing `stickers` table.
pub fn initialize(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!(
                    "Failed to create directory for database: {}",
                    db_path.display()
                )
            })?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    // WAL keeps readers from blocking the occasional collector write
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}
