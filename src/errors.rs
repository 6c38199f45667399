//! Unified application error type.
//! Store backends, ledger rules and CLI handlers all return AppError so that
//! every failure surfaces the same way: a message on stderr and exit code 1.

use crate::models::money::Money;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Store-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Document encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Concurrent update detected on {collection}/{id}")]
    Conflict { collection: String, id: String },

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid wage type: {0}")]
    InvalidWageType(String),

    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),

    // ---------------------------
    // Ledger rules
    // ---------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Attendance already recorded for worker {worker_id} on {date}")]
    DuplicateAttendance { worker_id: String, date: String },

    #[error("Payment of {requested} exceeds the pending amount of {pending}")]
    Overpayment { requested: Money, pending: Money },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for optimistic-concurrency rejections that are worth retrying.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict { .. })
    }
}

pub type AppResult<T> = Result<T, AppError>;
