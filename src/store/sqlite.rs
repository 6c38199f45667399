//! Embedded SQLite document store.
//!
//! Bodies are JSON text in a single `documents` table (see `db::migrate`).
//! Commits run inside an IMMEDIATE transaction so that the condition checks
//! and the writes see the same snapshot, even across processes.

use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::store::document::conflict;
use crate::store::{Collection, Document, DocumentStore, Write, WriteBatch};
use rusqlite::{Connection, TransactionBehavior};
use serde_json::{Map, Value};
use std::sync::Mutex;
use uuid::Uuid;

pub struct SqliteStore {
    pool: Mutex<DbPool>,
    path: String,
}

impl SqliteStore {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self {
            pool: Mutex::new(pool),
            path: path.to_string(),
        })
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self {
            pool: Mutex::new(pool),
            path: ":memory:".to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run `func` with exclusive access to the underlying connection.
    pub fn with_conn<F, T>(&self, func: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T>,
    {
        let mut pool = self
            .pool
            .lock()
            .map_err(|_| AppError::Store("sqlite connection lock poisoned".into()))?;
        pool.with_conn(func)
    }
}

impl DocumentStore for SqliteStore {
    fn insert(&self, collection: Collection, data: Map<String, Value>) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        self.with_conn(|conn| queries::insert_document(conn, collection, &id, &data))?;
        Ok(id)
    }

    fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        self.with_conn(|conn| queries::load_document(conn, collection, id))
    }

    fn query(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> AppResult<Vec<Document>> {
        let filters = [(field.to_string(), value.clone())];
        self.with_conn(|conn| queries::load_matching(conn, collection, &filters))
    }

    fn list(&self, collection: Collection) -> AppResult<Vec<Document>> {
        self.with_conn(|conn| queries::load_collection(conn, collection))
    }

    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> AppResult<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            queries::patch_document(&tx, collection, id, patch)?;
            tx.commit()?;
            Ok(())
        })
    }

    fn batch_delete(&self, collection: Collection, ids: &[String]) -> AppResult<usize> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let removed = queries::delete_documents(&tx, collection, ids)?;
            tx.commit()?;
            Ok(removed)
        })
    }

    fn commit(&self, batch: WriteBatch) -> AppResult<Vec<String>> {
        self.with_conn(|conn| {
            // dropping `tx` on any early return rolls everything back
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            for cond in &batch.conditions {
                if !queries::condition_holds(&tx, cond)? {
                    return Err(conflict(cond));
                }
            }

            let mut inserted = Vec::new();
            for w in batch.writes {
                match w {
                    Write::Insert { collection, data } => {
                        let id = Uuid::new_v4().to_string();
                        queries::insert_document(&tx, collection, &id, &data)?;
                        inserted.push(id);
                    }
                    Write::Update {
                        collection,
                        id,
                        patch,
                    } => queries::patch_document(&tx, collection, &id, patch)?,
                    Write::Delete { collection, ids } => {
                        queries::delete_documents(&tx, collection, &ids)?;
                    }
                }
            }

            tx.commit()?;
            Ok(inserted)
        })
    }
}
