//! SQL for the `documents` table. Each row is one JSON document.

use crate::errors::{AppError, AppResult};
use crate::store::document::conflict;
use crate::store::{Collection, Condition, Document, Filter};
use chrono::Local;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params, params_from_iter};
use serde_json::{Map, Value};

pub fn map_row(row: &Row) -> rusqlite::Result<Document> {
    let body: String = row.get("body")?;
    let data: Map<String, Value> = serde_json::from_str(&body).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Document {
        id: row.get("id")?,
        version: row.get::<_, i64>("version")? as u64,
        data,
    })
}

/// Scalar JSON → SQL value, the way `json_extract` reports it.
/// Arrays and objects have no SQL counterpart and return `None`.
fn json_to_sql(v: &Value) -> Option<SqlValue> {
    match v {
        Value::Null => Some(SqlValue::Null),
        Value::Bool(b) => Some(SqlValue::Integer(*b as i64)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| n.as_f64().map(SqlValue::Real)),
        Value::String(s) => Some(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Load documents of a collection matching every filter, in insertion order.
///
/// Scalar filters are pushed down to SQLite through `json_extract`; the
/// result is then re-checked in Rust so that `true` never equals `1`.
pub fn load_matching(
    conn: &Connection,
    collection: Collection,
    filters: &[Filter],
) -> AppResult<Vec<Document>> {
    let mut sql = String::from("SELECT id, version, body FROM documents WHERE collection = ?");
    let mut args: Vec<SqlValue> = vec![SqlValue::Text(collection.as_str().to_string())];

    for (field, value) in filters {
        match json_to_sql(value) {
            Some(SqlValue::Null) => {
                sql.push_str(" AND json_extract(body, ?) IS NULL");
                args.push(SqlValue::Text(format!("$.{field}")));
            }
            Some(v) => {
                sql.push_str(" AND json_extract(body, ?) = ?");
                args.push(SqlValue::Text(format!("$.{field}")));
                args.push(v);
            }
            None => {}
        }
    }
    sql.push_str(" ORDER BY seq ASC");

    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        let doc = r?;
        if doc.matches(filters) {
            out.push(doc);
        }
    }
    Ok(out)
}

pub fn load_collection(conn: &Connection, collection: Collection) -> AppResult<Vec<Document>> {
    load_matching(conn, collection, &[])
}

pub fn load_document(
    conn: &Connection,
    collection: Collection,
    id: &str,
) -> AppResult<Option<Document>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, version, body FROM documents
         WHERE collection = ?1 AND id = ?2",
    )?;
    Ok(stmt
        .query_row(params![collection.as_str(), id], map_row)
        .optional()?)
}

pub fn insert_document(
    conn: &Connection,
    collection: Collection,
    id: &str,
    data: &Map<String, Value>,
) -> AppResult<()> {
    let now = Local::now().to_rfc3339();
    let body = serde_json::to_string(data)?;

    conn.execute(
        "INSERT INTO documents (collection, id, version, body, created_at, updated_at)
         VALUES (?1, ?2, 1, ?3, ?4, ?4)",
        params![collection.as_str(), id, body, now],
    )
    .map_err(|e| constraint_to_conflict(e, collection, id))?;
    Ok(())
}

/// Persist body and version of an already patched document.
pub fn write_document(conn: &Connection, collection: Collection, doc: &Document) -> AppResult<()> {
    let body = serde_json::to_string(&doc.data)?;
    let changed = conn
        .execute(
            "UPDATE documents
             SET body = ?1, version = ?2, updated_at = ?3
             WHERE collection = ?4 AND id = ?5",
            params![
                body,
                doc.version as i64,
                Local::now().to_rfc3339(),
                collection.as_str(),
                doc.id,
            ],
        )
        .map_err(|e| constraint_to_conflict(e, collection, &doc.id))?;

    if changed == 0 {
        return Err(AppError::not_found(
            "Document",
            format!("{collection}/{}", doc.id),
        ));
    }
    Ok(())
}

/// Load, patch and write back one document.
pub fn patch_document(
    conn: &Connection,
    collection: Collection,
    id: &str,
    patch: Map<String, Value>,
) -> AppResult<()> {
    let mut doc = load_document(conn, collection, id)?
        .ok_or_else(|| AppError::not_found("Document", format!("{collection}/{id}")))?;
    doc.apply_patch(patch);
    write_document(conn, collection, &doc)
}

pub fn delete_documents(conn: &Connection, collection: Collection, ids: &[String]) -> AppResult<usize> {
    let mut stmt = conn.prepare_cached("DELETE FROM documents WHERE collection = ?1 AND id = ?2")?;
    let mut removed = 0;
    for id in ids {
        removed += stmt.execute(params![collection.as_str(), id])?;
    }
    Ok(removed)
}

pub fn condition_holds(conn: &Connection, cond: &Condition) -> AppResult<bool> {
    match cond {
        Condition::VersionEquals {
            collection,
            id,
            version,
        } => Ok(load_document(conn, *collection, id)?
            .map(|d| d.version == *version)
            .unwrap_or(false)),
        Condition::NoneMatching {
            collection,
            filters,
        } => Ok(load_matching(conn, *collection, filters)?.is_empty()),
    }
}

/// Document count per collection, for `db --info`.
pub fn count_by_collection(conn: &Connection) -> AppResult<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT collection, COUNT(*) FROM documents
         GROUP BY collection ORDER BY collection ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Unique-index hits mean another writer got there first.
fn constraint_to_conflict(e: rusqlite::Error, collection: Collection, id: &str) -> AppError {
    match e {
        rusqlite::Error::SqliteFailure(ref f, _) if f.code == ErrorCode::ConstraintViolation => {
            conflict(&Condition::VersionEquals {
                collection,
                id: id.to_string(),
                version: 0,
            })
        }
        other => AppError::Db(other),
    }
}
