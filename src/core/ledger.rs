//! The ledger service: typed CRUD over a [`DocumentStore`] plus the two
//! balance-changing operations, accrual and payment.
//!
//! Every balance change is read → compute → conditional commit. The commit
//! names the worker version the computation started from; if anyone wrote
//! the worker in between, the store answers `Conflict` and the whole
//! computation is redone against fresh data.

use crate::config::Config;
use crate::core::accrual::wage_delta;
use crate::core::audit;
use crate::core::payment::{apply_accrual, apply_payment};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{Attendance, AttendanceMark};
use crate::models::money::Money;
use crate::models::payment::{Payment, PaymentRequest};
use crate::models::site::Site;
use crate::models::worker::{Balance, WagePolicy, WageType, Worker};
use crate::store::document::filter;
use crate::store::{Collection, DocumentStore, Entity, Stored, WriteBatch};
use crate::ui::messages::warning;
use chrono::{Local, NaiveDate, NaiveTime};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerOptions {
    /// How many times a conflicting commit is recomputed before giving up.
    pub max_retries: u32,
    /// Keep only the newest N audit entries; 0 keeps everything.
    pub audit_log_cap: usize,
    pub allow_monthly: bool,
    pub default_payment_method: String,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            max_retries: 5,
            audit_log_cap: 100,
            allow_monthly: false,
            default_payment_method: "cash".to_string(),
        }
    }
}

impl From<&Config> for LedgerOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            max_retries: cfg.max_commit_retries,
            audit_log_cap: cfg.audit_log_cap,
            allow_monthly: cfg.enable_monthly_wage,
            default_payment_method: cfg.default_payment_method.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorker {
    pub site_id: String,
    pub name: String,
    pub phone: String,
    pub policy: WagePolicy,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub wage_type: Option<WageType>,
    pub wage_amount: Option<Money>,
    pub is_active: Option<bool>,
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub workers: usize,
    pub attendance: usize,
    pub payments: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceOutcome {
    pub attendance: Attendance,
    pub worker: Worker,
    pub delta: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub payment: Payment,
    pub worker: Worker,
}

pub struct Ledger<S: DocumentStore> {
    store: S,
    opts: LedgerOptions,
}

fn into_patch(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}

fn balance_patch(b: &Balance) -> Map<String, Value> {
    into_patch(json!({
        "pendingAmount": b.pending,
        "paidAmount": b.paid,
    }))
}

fn required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

impl<S: DocumentStore> Ledger<S> {
    pub fn new(store: S, opts: LedgerOptions) -> Self {
        Self { store, opts }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &LedgerOptions {
        &self.opts
    }

    // ------------------------------------------------
    // Typed store access
    // ------------------------------------------------

    pub(crate) fn fetch<T: Entity>(&self, id: &str) -> AppResult<Stored<T>> {
        let doc = self
            .store
            .get(T::COLLECTION, id)?
            .ok_or_else(|| AppError::not_found(T::KIND, id))?;
        T::from_document(doc)
    }

    pub(crate) fn fetch_all<T: Entity>(&self) -> AppResult<Vec<T>> {
        self.store
            .list(T::COLLECTION)?
            .into_iter()
            .map(|d| T::from_document(d).map(Stored::into_inner))
            .collect()
    }

    pub(crate) fn fetch_by<T: Entity>(&self, field: &str, value: &str) -> AppResult<Vec<T>> {
        self.store
            .query(T::COLLECTION, field, &Value::String(value.to_string()))?
            .into_iter()
            .map(|d| T::from_document(d).map(Stored::into_inner))
            .collect()
    }

    fn ids_by(&self, collection: Collection, field: &str, value: &str) -> AppResult<Vec<String>> {
        Ok(self
            .store
            .query(collection, field, &Value::String(value.to_string()))?
            .into_iter()
            .map(|d| d.id)
            .collect())
    }

    /// Re-run `op` while it fails with a concurrency conflict.
    fn retrying<T>(&self, mut op: impl FnMut() -> AppResult<T>) -> AppResult<T> {
        let mut attempt = 0;
        loop {
            match op() {
                Err(e) if e.is_conflict() && attempt < self.opts.max_retries => attempt += 1,
                other => return other,
            }
        }
    }

    /// Append to the audit trail. Failures are reported, never propagated.
    fn audit(&self, action: &str, details: String) {
        if let Err(e) = audit::record(&self.store, self.opts.audit_log_cap, action, details) {
            warning(format!("Failed to write audit entry '{}': {}", action, e));
        }
    }

    fn check_policy(&self, policy: &WagePolicy) -> AppResult<()> {
        policy.validate()?;
        if policy.wage_type == WageType::Monthly && !self.opts.allow_monthly {
            return Err(AppError::Validation(
                "The monthly wage type is disabled (set enable_monthly_wage: true to allow it)"
                    .into(),
            ));
        }
        Ok(())
    }

    // ------------------------------------------------
    // Sites
    // ------------------------------------------------

    pub fn add_site(&self, name: &str, address: &str) -> AppResult<Site> {
        required("Site name", name)?;

        let mut site = Site::new(name, address);
        site.id = self.store.insert(Collection::Sites, site.to_data()?)?;

        self.audit("create_site", format!("Created site: {}", site.name));
        Ok(site)
    }

    pub fn site(&self, id: &str) -> AppResult<Site> {
        Ok(self.fetch::<Site>(id)?.into_inner())
    }

    pub fn sites(&self, include_inactive: bool) -> AppResult<Vec<Site>> {
        let mut sites = self.fetch_all::<Site>()?;
        if !include_inactive {
            sites.retain(|s| s.is_active);
        }
        Ok(sites)
    }

    pub fn update_site(&self, id: &str, upd: SiteUpdate) -> AppResult<Site> {
        let current = self.site(id)?;
        let mut patch = Map::new();

        if let Some(name) = upd.name {
            required("Site name", &name)?;
            patch.insert("name".into(), Value::String(name.trim().to_string()));
        }
        if let Some(address) = upd.address {
            patch.insert("address".into(), Value::String(address.trim().to_string()));
        }
        if let Some(active) = upd.is_active {
            patch.insert("isActive".into(), Value::Bool(active));
        }
        if patch.is_empty() {
            return Ok(current);
        }

        self.store.update(Collection::Sites, id, patch)?;
        let site = self.site(id)?;
        self.audit("update_site", format!("Updated site: {}", site.name));
        Ok(site)
    }

    /// Delete a site together with its workers, attendance and payments.
    ///
    /// One commit, guarded by the site's version and every worker's version:
    /// an accrual, payment or new worker landing after the reads forces the
    /// cascade to be recomputed, so nothing is left pointing at the site.
    pub fn delete_site(&self, id: &str) -> AppResult<DeleteSummary> {
        let (site, summary) = self.retrying(|| {
            let stored = self.fetch::<Site>(id)?;
            let workers = self
                .store
                .query(Collection::Workers, "siteId", &Value::String(id.to_string()))?;
            let attendance = self.ids_by(Collection::Attendance, "siteId", id)?;
            let payments = self.ids_by(Collection::Payments, "siteId", id)?;

            let summary = DeleteSummary {
                workers: workers.len(),
                attendance: attendance.len(),
                payments: payments.len(),
            };

            let mut batch = WriteBatch::new().expect_version(Collection::Sites, id, stored.version);
            for w in &workers {
                batch = batch.expect_version(Collection::Workers, &w.id, w.version);
            }
            let worker_ids = workers.into_iter().map(|d| d.id).collect();
            self.store.commit(
                batch
                    .delete(Collection::Attendance, attendance)
                    .delete(Collection::Payments, payments)
                    .delete(Collection::Workers, worker_ids)
                    .delete(Collection::Sites, vec![id.to_string()]),
            )?;
            Ok((stored.value, summary))
        })?;

        self.audit(
            "delete_site",
            format!(
                "Deleted site: {} ({} workers, {} attendance, {} payments)",
                site.name, summary.workers, summary.attendance, summary.payments
            ),
        );
        Ok(summary)
    }

    // ------------------------------------------------
    // Workers
    // ------------------------------------------------

    pub fn add_worker(&self, new: NewWorker) -> AppResult<Worker> {
        required("Worker name", &new.name)?;
        self.check_policy(&new.policy)?;

        let (site, worker) = self.retrying(|| {
            let stored = self.fetch::<Site>(&new.site_id)?;
            let site = stored.value;
            if !site.is_active {
                return Err(AppError::Validation(format!(
                    "Site '{}' is inactive",
                    site.name
                )));
            }

            let mut worker = Worker::new(&site.id, &new.name, &new.phone, new.policy);
            // The empty patch bumps the site's version, which a concurrent
            // delete_site is guarded on.
            let batch = WriteBatch::new()
                .expect_version(Collection::Sites, &site.id, stored.version)
                .insert(Collection::Workers, worker.to_data()?)
                .update(Collection::Sites, &site.id, Map::new());
            worker.id = self
                .store
                .commit(batch)?
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Store("commit returned no worker id".into()))?;
            Ok((site, worker))
        })?;

        self.audit(
            "create_worker",
            format!("Added worker: {} to {}", worker.name, site.name),
        );
        Ok(worker)
    }

    pub fn worker(&self, id: &str) -> AppResult<Worker> {
        Ok(self.fetch::<Worker>(id)?.into_inner())
    }

    pub fn workers(&self) -> AppResult<Vec<Worker>> {
        self.fetch_all::<Worker>()
    }

    pub fn workers_for_site(&self, site_id: &str) -> AppResult<Vec<Worker>> {
        self.fetch_by::<Worker>("siteId", site_id)
    }

    /// Change profile or wage policy. Ledger figures are never part of the
    /// patch, so a concurrent accrual or payment is not overwritten.
    pub fn update_worker(&self, id: &str, upd: WorkerUpdate) -> AppResult<Worker> {
        let current = self.worker(id)?;
        let mut patch = Map::new();

        if let Some(name) = upd.name {
            required("Worker name", &name)?;
            patch.insert("name".into(), Value::String(name.trim().to_string()));
        }
        if let Some(phone) = upd.phone {
            patch.insert("phone".into(), Value::String(phone.trim().to_string()));
        }
        if upd.wage_type.is_some() || upd.wage_amount.is_some() {
            let policy = WagePolicy::new(
                upd.wage_type.unwrap_or(current.wage_type),
                upd.wage_amount.unwrap_or(current.wage_amount),
            );
            // Only switching the wage type is gated; a worker already on a
            // monthly wage can still have the rate corrected.
            match upd.wage_type {
                Some(_) => self.check_policy(&policy)?,
                None => policy.validate()?,
            }
            patch.insert("wageType".into(), serde_json::to_value(policy.wage_type)?);
            patch.insert("wageAmount".into(), serde_json::to_value(policy.wage_amount)?);
        }
        if let Some(active) = upd.is_active {
            patch.insert("isActive".into(), Value::Bool(active));
        }
        if patch.is_empty() {
            return Ok(current);
        }

        self.store.update(Collection::Workers, id, patch)?;
        let worker = self.worker(id)?;
        self.audit("update_worker", format!("Updated worker: {}", worker.name));
        Ok(worker)
    }

    /// Delete a worker together with their attendance and payments, in one
    /// commit guarded by the worker's version.
    pub fn delete_worker(&self, id: &str) -> AppResult<DeleteSummary> {
        let (worker, summary) = self.retrying(|| {
            let stored = self.fetch::<Worker>(id)?;
            let attendance = self.ids_by(Collection::Attendance, "workerId", id)?;
            let payments = self.ids_by(Collection::Payments, "workerId", id)?;

            let summary = DeleteSummary {
                workers: 1,
                attendance: attendance.len(),
                payments: payments.len(),
            };
            self.store.commit(
                WriteBatch::new()
                    .expect_version(Collection::Workers, id, stored.version)
                    .delete(Collection::Attendance, attendance)
                    .delete(Collection::Payments, payments)
                    .delete(Collection::Workers, vec![id.to_string()]),
            )?;
            Ok((stored.value, summary))
        })?;

        self.audit("delete_worker", format!("Deleted worker: {}", worker.name));
        Ok(summary)
    }

    // ------------------------------------------------
    // Attendance accrual
    // ------------------------------------------------

    /// Record one day of attendance and accrue its wage.
    ///
    /// The attendance insert and the pending-balance update commit together,
    /// guarded by the worker's version and by "no attendance yet for this
    /// worker and date".
    pub fn record_attendance(
        &self,
        worker_id: &str,
        date: NaiveDate,
        mark: AttendanceMark,
    ) -> AppResult<AttendanceOutcome> {
        let outcome = self.retrying(|| {
            let stored = self.fetch::<Worker>(worker_id)?;
            let mut worker = stored.value;
            if !worker.is_active {
                return Err(AppError::Validation(format!(
                    "Worker '{}' is inactive",
                    worker.name
                )));
            }

            let same_day = vec![filter("workerId", worker_id)?, filter("date", date)?];
            let taken = self
                .store
                .query(Collection::Attendance, "workerId", &same_day[0].1)?
                .iter()
                .any(|d| d.matches(&same_day));
            if taken {
                return Err(AppError::DuplicateAttendance {
                    worker_id: worker_id.to_string(),
                    date: date.to_string(),
                });
            }

            let accrual = wage_delta(&worker.policy(), &mark, date)?;
            let balance = apply_accrual(&worker.balance(), accrual.delta)?;

            let mut attendance = Attendance {
                id: String::new(),
                worker_id: worker.id.clone(),
                site_id: worker.site_id.clone(),
                date,
                status: mark.status,
                time_in: mark.time_in,
                time_out: mark.time_out,
                minutes_worked: accrual.minutes_worked,
                wage_earned: accrual.delta,
                incomplete: accrual.incomplete,
                created_at: Local::now(),
            };

            let batch = WriteBatch::new()
                .expect_version(Collection::Workers, worker_id, stored.version)
                .expect_none(Collection::Attendance, same_day)
                .insert(Collection::Attendance, attendance.to_data()?)
                .update(Collection::Workers, worker_id, balance_patch(&balance));

            attendance.id = self
                .store
                .commit(batch)?
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Store("commit returned no attendance id".into()))?;
            worker.set_balance(balance);

            Ok(AttendanceOutcome {
                attendance,
                worker,
                delta: accrual.delta,
            })
        })?;

        self.audit(
            "attendance",
            format!(
                "{} marked {} on {}: +{} (pending {})",
                outcome.worker.name,
                outcome.attendance.status,
                outcome.attendance.date,
                outcome.delta,
                outcome.worker.pending_amount
            ),
        );
        Ok(outcome)
    }

    /// Supply the missing check-out of an incomplete record and accrue the
    /// wage it was still owed.
    pub fn complete_attendance(
        &self,
        attendance_id: &str,
        time_out: NaiveTime,
    ) -> AppResult<AttendanceOutcome> {
        let outcome = self.retrying(|| {
            let stored_att = self.fetch::<Attendance>(attendance_id)?;
            let mut attendance = stored_att.value;
            if !attendance.incomplete {
                return Err(AppError::Validation(format!(
                    "Attendance {} already has a check-out time",
                    attendance_id
                )));
            }

            let stored_worker = self.fetch::<Worker>(&attendance.worker_id)?;
            let mut worker = stored_worker.value;

            let mut mark = attendance.mark();
            mark.time_out = Some(time_out);
            let accrual = wage_delta(&worker.policy(), &mark, attendance.date)?;
            let owed = accrual.delta.checked_sub(attendance.wage_earned)?;
            let balance = apply_accrual(&worker.balance(), owed)?;

            attendance.time_out = Some(time_out);
            attendance.minutes_worked = accrual.minutes_worked;
            attendance.wage_earned = accrual.delta;
            attendance.incomplete = accrual.incomplete;

            let att_patch = into_patch(json!({
                "timeOut": attendance.time_out,
                "minutesWorked": attendance.minutes_worked,
                "wageEarned": attendance.wage_earned,
                "incomplete": attendance.incomplete,
            }));

            let batch = WriteBatch::new()
                .expect_version(Collection::Attendance, attendance_id, stored_att.version)
                .expect_version(Collection::Workers, &worker.id, stored_worker.version)
                .update(Collection::Attendance, attendance_id, att_patch)
                .update(Collection::Workers, &worker.id, balance_patch(&balance));
            self.store.commit(batch)?;
            worker.set_balance(balance);

            Ok(AttendanceOutcome {
                attendance,
                worker,
                delta: owed,
            })
        })?;

        self.audit(
            "complete_attendance",
            format!(
                "{} checked out on {}: +{} (pending {})",
                outcome.worker.name,
                outcome.attendance.date,
                outcome.delta,
                outcome.worker.pending_amount
            ),
        );
        Ok(outcome)
    }

    // ------------------------------------------------
    // Payment application
    // ------------------------------------------------

    /// Pay a worker out of their pending balance.
    ///
    /// The bound is checked against the balance read inside the retried
    /// computation, i.e. the latest committed one.
    pub fn record_payment(&self, worker_id: &str, req: PaymentRequest) -> AppResult<PaymentOutcome> {
        if !req.amount.is_positive() {
            return Err(AppError::Validation(format!(
                "Payment amount must be greater than 0 (got {})",
                req.amount
            )));
        }

        let method = if req.method.trim().is_empty() {
            self.opts.default_payment_method.clone()
        } else {
            req.method.trim().to_string()
        };

        let outcome = self.retrying(|| {
            let stored = self.fetch::<Worker>(worker_id)?;
            let mut worker = stored.value;
            let balance = apply_payment(&worker.balance(), req.amount)?;

            let mut payment = Payment {
                id: String::new(),
                worker_id: worker.id.clone(),
                site_id: worker.site_id.clone(),
                amount: req.amount,
                date: req.date,
                method: method.clone(),
                kind: req.kind,
                notes: req.notes.clone().filter(|n| !n.trim().is_empty()),
                created_at: Local::now(),
            };

            let batch = WriteBatch::new()
                .expect_version(Collection::Workers, worker_id, stored.version)
                .insert(Collection::Payments, payment.to_data()?)
                .update(Collection::Workers, worker_id, balance_patch(&balance));

            payment.id = self
                .store
                .commit(batch)?
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Store("commit returned no payment id".into()))?;
            worker.set_balance(balance);

            Ok(PaymentOutcome { payment, worker })
        })?;

        self.audit(
            "payment",
            format!(
                "Paid {} {} ({}, {}) (pending {})",
                outcome.worker.name,
                outcome.payment.amount,
                outcome.payment.kind,
                outcome.payment.method,
                outcome.worker.pending_amount
            ),
        );
        Ok(outcome)
    }

    // ------------------------------------------------
    // History
    // ------------------------------------------------

    pub fn attendance_for_worker(&self, worker_id: &str) -> AppResult<Vec<Attendance>> {
        let mut rows = self.fetch_by::<Attendance>("workerId", worker_id)?;
        rows.sort_by_key(|a| a.date);
        Ok(rows)
    }

    pub fn payments_for_worker(&self, worker_id: &str) -> AppResult<Vec<Payment>> {
        let mut rows = self.fetch_by::<Payment>("workerId", worker_id)?;
        rows.sort_by_key(|p| (p.date, p.created_at));
        Ok(rows)
    }

    pub fn attendance(&self, id: &str) -> AppResult<Attendance> {
        Ok(self.fetch::<Attendance>(id)?.into_inner())
    }
}
