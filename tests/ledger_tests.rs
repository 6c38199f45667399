use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value, json};
use siteledger::core::audit;
use siteledger::core::ledger::{Ledger, LedgerOptions, WorkerUpdate};
use siteledger::errors::{AppError, AppResult};
use siteledger::models::attendance::{AttendanceMark, AttendanceStatus};
use siteledger::models::money::Money;
use siteledger::models::payment::{PaymentKind, PaymentRequest};
use siteledger::models::worker::{Balance, WageType};
use siteledger::store::memory::MemoryStore;
use siteledger::store::sqlite::SqliteStore;
use siteledger::store::{Collection, Document, DocumentStore, WriteBatch};
use std::sync::{Arc, Mutex};
use std::thread;

mod common;
use common::{add_worker, options, setup_test_db};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn present() -> AttendanceMark {
    AttendanceMark::status(AttendanceStatus::Present)
}

fn pay(units: i64) -> PaymentRequest {
    PaymentRequest::new(Money::from_units(units), day(30))
}

fn balance_of<S: DocumentStore>(ledger: &Ledger<S>, id: &str) -> Balance {
    ledger.worker(id).unwrap().balance()
}

fn units(pending: i64, paid: i64) -> Balance {
    Balance::new(Money::from_units(pending), Money::from_units(paid))
}

fn memory_ledger() -> Ledger<MemoryStore> {
    Ledger::new(MemoryStore::new(), options())
}

fn sqlite_ledger() -> Ledger<SqliteStore> {
    Ledger::new(SqliteStore::open_in_memory().unwrap(), options())
}

// ------------------------------------------------
// Properties checked against both backends
// ------------------------------------------------

fn payments_stay_within_pending<S: DocumentStore>(ledger: Ledger<S>) {
    let w = add_worker(&ledger, WageType::Daily, 800);
    for d in 1..=3 {
        ledger.record_attendance(&w.id, day(d), present()).unwrap();
    }
    assert_eq!(balance_of(&ledger, &w.id), units(2400, 0));

    let mut before = balance_of(&ledger, &w.id);
    for amount in [500, 900, 1000] {
        let out = ledger.record_payment(&w.id, pay(amount)).unwrap();
        let after = out.worker.balance();
        assert_eq!(after.pending, before.pending - Money::from_units(amount));
        assert_eq!(after.paid, before.paid + Money::from_units(amount));
        before = after;
    }

    assert!(matches!(
        ledger.record_payment(&w.id, pay(1)),
        Err(AppError::Overpayment { .. })
    ));
    assert_eq!(balance_of(&ledger, &w.id), units(0, 2400));
}

fn rejected_payments_leave_no_trace<S: DocumentStore>(ledger: Ledger<S>) {
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    let err = ledger.record_payment(&w.id, pay(801)).unwrap_err();
    match err {
        AppError::Overpayment { requested, pending } => {
            assert_eq!(requested, Money::from_units(801));
            assert_eq!(pending, Money::from_units(800));
        }
        other => panic!("unexpected error: {other}"),
    }

    for bad in [0, -50] {
        assert!(matches!(
            ledger.record_payment(&w.id, pay(bad)),
            Err(AppError::Validation(_))
        ));
    }

    assert_eq!(balance_of(&ledger, &w.id), units(800, 0));
    assert!(ledger.payments_for_worker(&w.id).unwrap().is_empty());
}

fn daily_and_hourly_accrual<S: DocumentStore>(ledger: Ledger<S>) {
    let daily = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&daily.id, day(1), present()).unwrap();
    assert_eq!(balance_of(&ledger, &daily.id), units(800, 0));

    ledger
        .record_attendance(&daily.id, day(2), AttendanceMark::status(AttendanceStatus::HalfDay))
        .unwrap();
    assert_eq!(balance_of(&ledger, &daily.id), units(1200, 0));

    ledger
        .record_attendance(&daily.id, day(3), AttendanceMark::status(AttendanceStatus::Absent))
        .unwrap();
    assert_eq!(balance_of(&ledger, &daily.id), units(1200, 0));

    let hourly = add_worker(&ledger, WageType::Hourly, 100);
    let out = ledger
        .record_attendance(&hourly.id, day(1), AttendanceMark::shift(t(9, 0), Some(t(15, 0))))
        .unwrap();
    assert_eq!(out.delta, Money::from_units(600));
    assert_eq!(out.attendance.minutes_worked, Some(360));
    assert_eq!(balance_of(&ledger, &hourly.id), units(600, 0));
}

fn duplicate_attendance_is_rejected<S: DocumentStore>(ledger: Ledger<S>) {
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    let err = ledger
        .record_attendance(&w.id, day(1), AttendanceMark::status(AttendanceStatus::HalfDay))
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateAttendance { .. }));

    assert_eq!(balance_of(&ledger, &w.id), units(800, 0));
    assert_eq!(ledger.attendance_for_worker(&w.id).unwrap().len(), 1);
}

fn accrue_then_pay_round_trip<S: DocumentStore>(ledger: Ledger<S>) {
    let w = add_worker(&ledger, WageType::Daily, 800);
    assert_eq!(w.balance(), units(0, 0));

    ledger.record_attendance(&w.id, day(1), present()).unwrap();
    ledger.record_payment(&w.id, pay(800)).unwrap();

    assert_eq!(balance_of(&ledger, &w.id), units(0, 800));
    assert!(ledger.reconcile_all().unwrap().is_empty());
}

macro_rules! on_both_backends {
    ($($name:ident),* $(,)?) => {
        mod memory_backend {
            use super::*;
            $( #[test] fn $name() { super::$name(memory_ledger()); } )*
        }
        mod sqlite_backend {
            use super::*;
            $( #[test] fn $name() { super::$name(sqlite_ledger()); } )*
        }
    };
}

on_both_backends!(
    payments_stay_within_pending,
    rejected_payments_leave_no_trace,
    daily_and_hourly_accrual,
    duplicate_attendance_is_rejected,
    accrue_then_pay_round_trip,
);

// ------------------------------------------------
// Optimistic concurrency
// ------------------------------------------------

type Race = Box<dyn FnOnce(&MemoryStore) -> AppResult<()> + Send>;

/// Memory store that lets another writer slip in right before the next commit.
struct RacingStore {
    inner: MemoryStore,
    race: Mutex<Option<Race>>,
}

impl RacingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            race: Mutex::new(None),
        }
    }

    fn arm(&self, worker_id: &str, patch: Value) {
        let Value::Object(patch) = patch else {
            panic!("patch must be an object")
        };
        let id = worker_id.to_string();
        self.arm_with(move |store| store.update(Collection::Workers, &id, patch));
    }

    fn arm_with(&self, race: impl FnOnce(&MemoryStore) -> AppResult<()> + Send + 'static) {
        *self.race.lock().unwrap() = Some(Box::new(race));
    }
}

impl DocumentStore for RacingStore {
    fn insert(&self, collection: Collection, data: Map<String, Value>) -> AppResult<String> {
        self.inner.insert(collection, data)
    }

    fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        self.inner.get(collection, id)
    }

    fn query(&self, collection: Collection, field: &str, value: &Value) -> AppResult<Vec<Document>> {
        self.inner.query(collection, field, value)
    }

    fn list(&self, collection: Collection) -> AppResult<Vec<Document>> {
        self.inner.list(collection)
    }

    fn update(&self, collection: Collection, id: &str, patch: Map<String, Value>) -> AppResult<()> {
        self.inner.update(collection, id, patch)
    }

    fn batch_delete(&self, collection: Collection, ids: &[String]) -> AppResult<usize> {
        self.inner.batch_delete(collection, ids)
    }

    fn commit(&self, batch: WriteBatch) -> AppResult<Vec<String>> {
        let race = self.race.lock().unwrap().take();
        if let Some(race) = race {
            race(&self.inner)?;
        }
        self.inner.commit(batch)
    }
}

#[test]
fn payment_is_recomputed_after_a_concurrent_write() {
    let ledger = Ledger::new(RacingStore::new(), options());
    let w = add_worker(&ledger, WageType::Daily, 1000);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    // Another clerk pays 700 between our read and our commit.
    ledger
        .store()
        .arm(&w.id, json!({ "pendingAmount": 30000, "paidAmount": 70000 }));
    ledger.record_payment(&w.id, pay(200)).unwrap();

    assert_eq!(balance_of(&ledger, &w.id), units(100, 900));
}

#[test]
fn retried_payment_sees_the_shrunken_balance() {
    let ledger = Ledger::new(RacingStore::new(), options());
    let w = add_worker(&ledger, WageType::Daily, 1000);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    ledger
        .store()
        .arm(&w.id, json!({ "pendingAmount": 30000, "paidAmount": 70000 }));
    let err = ledger.record_payment(&w.id, pay(500)).unwrap_err();

    assert!(matches!(err, AppError::Overpayment { .. }));
    assert_eq!(balance_of(&ledger, &w.id), units(300, 700));
    assert!(ledger.payments_for_worker(&w.id).unwrap().is_empty());
}

#[test]
fn stale_commit_without_retries_is_a_conflict() {
    let opts = LedgerOptions {
        max_retries: 0,
        ..options()
    };
    let ledger = Ledger::new(RacingStore::new(), opts);
    let w = add_worker(&ledger, WageType::Daily, 1000);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    ledger
        .store()
        .arm(&w.id, json!({ "pendingAmount": 90000, "paidAmount": 10000 }));
    let err = ledger.record_attendance(&w.id, day(2), present()).unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(balance_of(&ledger, &w.id), units(900, 100));
    assert_eq!(ledger.attendance_for_worker(&w.id).unwrap().len(), 1);
}

#[test]
fn concurrent_payments_never_overdraw_memory() {
    let ledger = Arc::new(memory_ledger());
    let w = add_worker(&*ledger, WageType::Daily, 1000);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();
    ledger.record_attendance(&w.id, day(2), present()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let id = w.id.clone();
            thread::spawn(move || {
                (0..5)
                    .filter(|_| ledger.record_payment(&id, pay(100)).is_ok())
                    .count()
            })
        })
        .collect();

    let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(accepted, 20);
    assert_eq!(balance_of(&*ledger, &w.id), units(0, 2000));
    assert_eq!(ledger.payments_for_worker(&w.id).unwrap().len(), 20);
}

#[test]
fn concurrent_payments_never_overdraw_sqlite_file() {
    let db_path = setup_test_db("concurrent_payments");
    let setup = Ledger::new(SqliteStore::open(&db_path).unwrap(), options());
    let w = add_worker(&setup, WageType::Daily, 500);
    setup.record_attendance(&w.id, day(1), present()).unwrap();
    setup.record_attendance(&w.id, day(2), present()).unwrap();

    // Each thread has its own connection, like separate processes would.
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = db_path.clone();
            let id = w.id.clone();
            thread::spawn(move || {
                let ledger = Ledger::new(SqliteStore::open(&path).unwrap(), options());
                (0..5)
                    .filter(|_| ledger.record_payment(&id, pay(100)).is_ok())
                    .count()
            })
        })
        .collect();

    let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(accepted, 10);
    assert_eq!(balance_of(&setup, &w.id), units(0, 1000));
}

// ------------------------------------------------
// Completion, cascades, payroll, audit
// ------------------------------------------------

#[test]
fn completing_an_open_shift_accrues_the_missing_wage() {
    let ledger = memory_ledger();
    let w = add_worker(&ledger, WageType::Hourly, 100);

    let open = ledger
        .record_attendance(&w.id, day(1), AttendanceMark::shift(t(9, 0), None))
        .unwrap();
    assert!(open.attendance.incomplete);
    assert_eq!(open.delta, Money::ZERO);

    let done = ledger.complete_attendance(&open.attendance.id, t(17, 30)).unwrap();
    assert_eq!(done.delta, Money::from_units(850));
    assert!(!done.attendance.incomplete);
    assert_eq!(balance_of(&ledger, &w.id), units(850, 0));

    assert!(matches!(
        ledger.complete_attendance(&open.attendance.id, t(18, 0)),
        Err(AppError::Validation(_))
    ));
    assert!(ledger.reconcile_all().unwrap().is_empty());
}

#[test]
fn deleting_a_site_removes_its_workers_and_history() {
    let ledger = sqlite_ledger();
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();
    ledger.record_attendance(&w.id, day(2), present()).unwrap();
    ledger.record_payment(&w.id, pay(300)).unwrap();

    let summary = ledger.delete_site(&w.site_id).unwrap();
    assert_eq!(summary.workers, 1);
    assert_eq!(summary.attendance, 2);
    assert_eq!(summary.payments, 1);

    assert!(matches!(ledger.worker(&w.id), Err(AppError::NotFound { .. })));
    assert!(matches!(ledger.site(&w.site_id), Err(AppError::NotFound { .. })));
    assert!(ledger.attendance_for_worker(&w.id).unwrap().is_empty());
}

fn object(v: Value) -> Map<String, Value> {
    let Value::Object(m) = v else {
        panic!("expected an object")
    };
    m
}

#[test]
fn deleting_a_worker_sweeps_attendance_marked_mid_delete() {
    let ledger = Ledger::new(RacingStore::new(), options());
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    // Another clerk marks day 2 between our reads and our commit.
    let (worker_id, site_id) = (w.id.clone(), w.site_id.clone());
    ledger.store().arm_with(move |store| {
        store.insert(
            Collection::Attendance,
            object(json!({ "workerId": worker_id, "siteId": site_id, "date": "2025-09-02" })),
        )?;
        store.update(
            Collection::Workers,
            &worker_id,
            object(json!({ "pendingAmount": 160000 })),
        )
    });

    let summary = ledger.delete_worker(&w.id).unwrap();
    assert_eq!(summary.attendance, 2);
    assert!(ledger.store().list(Collection::Attendance).unwrap().is_empty());
    assert!(matches!(ledger.worker(&w.id), Err(AppError::NotFound { .. })));
}

#[test]
fn deleting_a_site_sweeps_a_worker_added_mid_delete() {
    let ledger = Ledger::new(RacingStore::new(), options());
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    // A second worker joins the site between our reads and our commit.
    let site_id = w.site_id.clone();
    ledger.store().arm_with(move |store| {
        store.insert(
            Collection::Workers,
            object(json!({ "siteId": site_id, "name": "Mohan", "pendingAmount": 0 })),
        )?;
        store.update(Collection::Sites, &site_id, Map::new())
    });

    let summary = ledger.delete_site(&w.site_id).unwrap();
    assert_eq!(summary.workers, 2);
    assert_eq!(summary.attendance, 1);
    assert!(ledger.store().list(Collection::Workers).unwrap().is_empty());
    assert!(ledger.store().list(Collection::Sites).unwrap().is_empty());
}

#[test]
fn cascade_without_retries_leaves_everything_in_place() {
    let opts = LedgerOptions {
        max_retries: 0,
        ..options()
    };
    let ledger = Ledger::new(RacingStore::new(), opts);
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    ledger
        .store()
        .arm(&w.id, json!({ "pendingAmount": 90000 }));
    let err = ledger.delete_worker(&w.id).unwrap_err();

    assert!(err.is_conflict());
    assert!(ledger.worker(&w.id).is_ok());
    assert_eq!(ledger.attendance_for_worker(&w.id).unwrap().len(), 1);
}

#[test]
fn wage_overflow_is_rejected_without_touching_the_balance() {
    let ledger = memory_ledger();
    let w = add_worker(&ledger, WageType::Daily, 60_000_000_000_000_000);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    let err = ledger.record_attendance(&w.id, day(2), present()).unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));
    assert_eq!(balance_of(&ledger, &w.id), units(60_000_000_000_000_000, 0));
    assert_eq!(ledger.attendance_for_worker(&w.id).unwrap().len(), 1);
}

#[test]
fn monthly_rate_can_be_edited_while_the_type_is_disabled() {
    let db_path = setup_test_db("monthly_rate_edit");
    let enabled = Ledger::new(SqliteStore::open(&db_path).unwrap(), options());
    let monthly = add_worker(&enabled, WageType::Monthly, 30000);
    let daily = add_worker(&enabled, WageType::Daily, 800);

    let disabled = Ledger::new(SqliteStore::open(&db_path).unwrap(), LedgerOptions::default());
    let edited = disabled
        .update_worker(
            &monthly.id,
            WorkerUpdate {
                wage_amount: Some(Money::from_units(32000)),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(edited.wage_type, WageType::Monthly);
    assert_eq!(edited.wage_amount, Money::from_units(32000));

    let err = disabled
        .update_worker(
            &daily.id,
            WorkerUpdate {
                wage_type: Some(WageType::Monthly),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn editing_a_worker_keeps_the_ledger() {
    let ledger = memory_ledger();
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    let edited = ledger
        .update_worker(
            &w.id,
            WorkerUpdate {
                wage_amount: Some(Money::from_units(900)),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(edited.wage_amount, Money::from_units(900));
    assert_eq!(edited.balance(), units(800, 0));

    ledger.record_attendance(&w.id, day(2), present()).unwrap();
    assert_eq!(balance_of(&ledger, &w.id), units(1700, 0));
}

#[test]
fn monthly_wage_type_needs_to_be_enabled() {
    let ledger = Ledger::new(MemoryStore::new(), LedgerOptions::default());
    let site = ledger.add_site("Depot", "").unwrap();
    let err = ledger
        .add_worker(siteledger::core::ledger::NewWorker {
            site_id: site.id,
            name: "Suresh".into(),
            phone: String::new(),
            policy: siteledger::models::worker::WagePolicy::new(
                WageType::Monthly,
                Money::from_units(30000),
            ),
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn inactive_workers_cannot_be_marked() {
    let ledger = memory_ledger();
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger
        .update_worker(
            &w.id,
            WorkerUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

    assert!(matches!(
        ledger.record_attendance(&w.id, day(1), present()),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn payroll_deducts_advances_and_flags_open_shifts() {
    let ledger = memory_ledger();
    let daily = add_worker(&ledger, WageType::Daily, 800);
    for d in 1..=5 {
        ledger.record_attendance(&daily.id, day(d), present()).unwrap();
    }
    // Outside the month, must not count.
    ledger
        .record_attendance(&daily.id, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(), present())
        .unwrap();

    let mut advance = pay(1000);
    advance.kind = PaymentKind::Advance;
    advance.date = day(10);
    ledger.record_payment(&daily.id, advance).unwrap();

    let mut wage = pay(500);
    wage.date = day(12);
    ledger.record_payment(&daily.id, wage).unwrap();

    let site_id = daily.site_id.clone();
    let hourly = ledger
        .add_worker(siteledger::core::ledger::NewWorker {
            site_id: site_id.clone(),
            name: "Anil".into(),
            phone: String::new(),
            policy: siteledger::models::worker::WagePolicy::new(
                WageType::Hourly,
                Money::from_units(100),
            ),
        })
        .unwrap();
    ledger
        .record_attendance(&hourly.id, day(3), AttendanceMark::shift(t(8, 0), None))
        .unwrap();

    let payroll = ledger.payroll(&site_id, 2025, 9).unwrap();
    assert_eq!(payroll.lines.len(), 2);

    let line = payroll
        .lines
        .iter()
        .find(|l| l.worker.id == daily.id)
        .unwrap();
    assert_eq!(line.days, 5);
    assert_eq!(line.gross, Money::from_units(4000));
    assert_eq!(line.advances, Money::from_units(1000));
    assert_eq!(line.net, Money::from_units(3000));
    assert!(line.warnings.is_empty());

    let open = payroll
        .lines
        .iter()
        .find(|l| l.worker.id == hourly.id)
        .unwrap();
    assert_eq!(open.gross, Money::ZERO);
    assert_eq!(open.warnings, vec!["Missing check-out times".to_string()]);

    assert_eq!(payroll.total_net(), Money::from_units(3000));
}

#[test]
fn dashboard_totals_sum_every_worker() {
    let ledger = memory_ledger();
    let a = add_worker(&ledger, WageType::Daily, 800);
    let b = add_worker(&ledger, WageType::Daily, 600);
    ledger.record_attendance(&a.id, day(1), present()).unwrap();
    ledger.record_attendance(&b.id, day(1), present()).unwrap();
    ledger.record_payment(&b.id, pay(200)).unwrap();

    let totals = ledger.dashboard_totals().unwrap();
    assert_eq!(totals.active_sites, 2);
    assert_eq!(totals.active_workers, 2);
    assert_eq!(totals.attendance, 2);
    assert_eq!(totals.payments, 1);
    assert_eq!(totals.pending, Money::from_units(1200));
    assert_eq!(totals.paid, Money::from_units(200));
}

#[test]
fn reconcile_reports_a_tampered_balance() {
    let ledger = memory_ledger();
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();

    let Value::Object(patch) = json!({ "pendingAmount": 12345 }) else {
        unreachable!()
    };
    ledger.store().update(Collection::Workers, &w.id, patch).unwrap();

    let found = ledger.reconcile_all().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].derived, units(800, 0));
    assert_eq!(found[0].stored.pending, Money::from_minor(12345));
}

#[test]
fn ledger_operations_are_audited_and_capped() {
    let opts = LedgerOptions {
        audit_log_cap: 3,
        ..options()
    };
    let ledger = Ledger::new(MemoryStore::new(), opts);
    let w = add_worker(&ledger, WageType::Daily, 800);
    ledger.record_attendance(&w.id, day(1), present()).unwrap();
    ledger.record_payment(&w.id, pay(100)).unwrap();

    let entries = audit::recent(ledger.store(), None).unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["payment", "attendance", "create_worker"]);
}
