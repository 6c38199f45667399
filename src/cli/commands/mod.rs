pub mod attend;
pub mod audit;
pub mod backup;
pub mod config;
pub mod db;
pub mod init;
pub mod pay;
pub mod payroll;
pub mod reconcile;
pub mod site;
pub mod summary;
pub mod worker;

use crate::config::Config;
use crate::core::ledger::{Ledger, LedgerOptions};
use crate::errors::AppResult;
use crate::store::sqlite::SqliteStore;

/// Open the configured database as a ledger.
pub(crate) fn open_ledger(cfg: &Config) -> AppResult<Ledger<SqliteStore>> {
    let store = SqliteStore::open(&cfg.database)?;
    Ok(Ledger::new(store, LedgerOptions::from(cfg)))
}
