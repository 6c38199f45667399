#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use siteledger::core::ledger::{Ledger, LedgerOptions, NewWorker};
use siteledger::models::money::Money;
use siteledger::models::worker::{WagePolicy, WageType, Worker};
use siteledger::store::DocumentStore;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn sl() -> Command {
    cargo_bin_cmd!("siteledger")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_siteledger.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    for suffix in ["", "-wal", "-shm"] {
        fs::remove_file(format!("{db_path}{suffix}")).ok();
    }
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize a DB through the binary, as a user would.
pub fn init_db(db_path: &str) {
    sl().args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Pull the id printed as `(id <uuid>)` out of a command's stdout.
pub fn created_id(stdout: &[u8]) -> String {
    let out = String::from_utf8_lossy(stdout);
    let start = out.find("(id ").expect("no id in output") + 4;
    let end = out[start..].find(')').expect("unterminated id") + start;
    out[start..end].to_string()
}

pub fn options() -> LedgerOptions {
    LedgerOptions {
        max_retries: 1000,
        audit_log_cap: 100,
        allow_monthly: true,
        default_payment_method: "cash".into(),
    }
}

pub fn add_worker<S: DocumentStore>(
    ledger: &Ledger<S>,
    wage_type: WageType,
    units: i64,
) -> Worker {
    let site = ledger.add_site("Riverside Block A", "Plot 14").expect("site");
    ledger
        .add_worker(NewWorker {
            site_id: site.id,
            name: "Ravi Kumar".into(),
            phone: "9800000000".into(),
            policy: WagePolicy::new(wage_type, Money::from_units(units)),
        })
        .expect("worker")
}
