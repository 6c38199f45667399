//! Document-store collaborator.
//!
//! The ledger never talks to a concrete database: it is handed something that
//! implements [`DocumentStore`]. Two backends ship with the crate:
//!
//! - [`sqlite::SqliteStore`]: the embedded store used by the CLI.
//! - [`memory::MemoryStore`]: a process-local store for tests and scratch use.
//!
//! Plain `insert`/`update`/`batch_delete` calls are unconditional. Ledger
//! mutations go through [`DocumentStore::commit`], which checks every
//! [`Condition`] and applies every [`Write`] of a [`WriteBatch`] as one unit,
//! or nothing at all.

pub mod document;
pub mod memory;
pub mod sqlite;

pub use document::{Document, Entity, Stored};

use crate::errors::AppResult;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Sites,
    Workers,
    Attendance,
    Payments,
    AuditLog,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Sites,
        Collection::Workers,
        Collection::Attendance,
        Collection::Payments,
        Collection::AuditLog,
    ];

    /// Convert enum → DB string
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Sites => "sites",
            Collection::Workers => "workers",
            Collection::Attendance => "attendance",
            Collection::Payments => "payments",
            Collection::AuditLog => "audit_log",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        Collection::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field equality filter: `field == value`.
pub type Filter = (String, Value);

/// Precondition checked inside [`DocumentStore::commit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The document exists and has not been written since `version` was read.
    VersionEquals {
        collection: Collection,
        id: String,
        version: u64,
    },
    /// No document of the collection matches all the filters.
    NoneMatching {
        collection: Collection,
        filters: Vec<Filter>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Insert {
        collection: Collection,
        data: Map<String, Value>,
    },
    Update {
        collection: Collection,
        id: String,
        patch: Map<String, Value>,
    },
    /// Remove the listed ids; ids that are already gone are skipped.
    Delete {
        collection: Collection,
        ids: Vec<String>,
    },
}

/// Conditions plus writes, committed atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub conditions: Vec<Condition>,
    pub writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_version(mut self, collection: Collection, id: &str, version: u64) -> Self {
        self.conditions.push(Condition::VersionEquals {
            collection,
            id: id.to_string(),
            version,
        });
        self
    }

    pub fn expect_none(mut self, collection: Collection, filters: Vec<Filter>) -> Self {
        self.conditions
            .push(Condition::NoneMatching { collection, filters });
        self
    }

    pub fn insert(mut self, collection: Collection, data: Map<String, Value>) -> Self {
        self.writes.push(Write::Insert { collection, data });
        self
    }

    pub fn update(mut self, collection: Collection, id: &str, patch: Map<String, Value>) -> Self {
        self.writes.push(Write::Update {
            collection,
            id: id.to_string(),
            patch,
        });
        self
    }

    pub fn delete(mut self, collection: Collection, ids: Vec<String>) -> Self {
        if !ids.is_empty() {
            self.writes.push(Write::Delete { collection, ids });
        }
        self
    }
}

/// Storage primitives the ledger relies on.
///
/// Documents come back in insertion order from `list` and `query`.
/// Every successful write bumps the document's version by one.
pub trait DocumentStore: Send + Sync {
    /// Store a new document and return its assigned id.
    fn insert(&self, collection: Collection, data: Map<String, Value>) -> AppResult<String>;

    fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>>;

    fn query(&self, collection: Collection, field: &str, value: &Value)
    -> AppResult<Vec<Document>>;

    fn list(&self, collection: Collection) -> AppResult<Vec<Document>>;

    /// Merge `patch` into an existing document. Fails with `NotFound` when absent.
    fn update(&self, collection: Collection, id: &str, patch: Map<String, Value>)
    -> AppResult<()>;

    /// Delete every listed id that exists; returns how many were removed.
    fn batch_delete(&self, collection: Collection, ids: &[String]) -> AppResult<usize>;

    /// Check all conditions, then apply all writes, atomically.
    ///
    /// A failed condition yields `AppError::Conflict` and leaves the store
    /// untouched. Returns the ids of the inserted documents, in order.
    fn commit(&self, batch: WriteBatch) -> AppResult<Vec<String>>;
}
