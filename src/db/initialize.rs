use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Prepare a freshly opened connection: pragmas first, then the schema.
///
/// Tables and indexes are owned by the migration engine; nothing here
/// creates them directly.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    // in-memory databases report "memory" and ignore the request
    let _mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    run_pending_migrations(conn)?;
    Ok(())
}
