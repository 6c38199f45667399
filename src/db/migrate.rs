use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

/// A schema step, applied once and remembered in `schema_migrations`.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20251001_0001_create_documents",
        description: "Created documents table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS documents (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            collection  TEXT NOT NULL,
            id          TEXT NOT NULL,
            version     INTEGER NOT NULL DEFAULT 1,
            body        TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL,
            UNIQUE(collection, id)
        );

        CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq);
        "#,
    },
    Migration {
        version: "20251008_0002_index_foreign_keys",
        description: "Indexed siteId / workerId lookups",
        sql: r#"
        CREATE INDEX IF NOT EXISTS idx_documents_site
            ON documents(collection, json_extract(body, '$.siteId'));
        CREATE INDEX IF NOT EXISTS idx_documents_worker
            ON documents(collection, json_extract(body, '$.workerId'));
        "#,
    },
    Migration {
        version: "20251012_0003_unique_attendance_day",
        description: "One attendance row per worker and day",
        sql: r#"
        CREATE UNIQUE INDEX IF NOT EXISTS ux_attendance_worker_date
            ON documents(json_extract(body, '$.workerId'), json_extract(body, '$.date'))
            WHERE collection = 'attendance';
        "#,
    },
];

/// Ensure that the `schema_migrations` bookkeeping table exists.
fn ensure_migrations_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version     TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let found: Option<i32> = conn
        .query_row(
            "SELECT 1 FROM schema_migrations WHERE version = ?1 LIMIT 1",
            [version],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", m.sql))
        .map_err(|e| {
            let _ = conn.execute_batch("ROLLBACK;");
            AppError::Migration(format!("{}: {}", m.version, e))
        })?;

    conn.execute(
        "INSERT INTO schema_migrations (version, description, applied_at)
         VALUES (?1, ?2, ?3)",
        params![m.version, m.description, Local::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Versions not yet applied to this database, oldest first.
pub fn pending_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_migrations_table(conn)?;
    let mut out = Vec::new();
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            out.push(m.version);
        }
    }
    Ok(out)
}

/// Applied versions with their timestamps, oldest first.
pub fn applied_migrations(conn: &Connection) -> AppResult<Vec<(String, String)>> {
    ensure_migrations_table(conn)?;
    let mut stmt =
        conn.prepare("SELECT version, applied_at FROM schema_migrations ORDER BY version ASC")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_migrations_table(conn)?;

    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        success(format!("Migration applied: {} → {}", m.version, m.description));
    }

    Ok(())
}
