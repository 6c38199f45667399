//! Read-side helpers: statements, balance reconciliation, totals and payroll.

use crate::core::ledger::Ledger;
use crate::errors::AppResult;
use crate::models::attendance::{Attendance, AttendanceStatus};
use crate::models::money::Money;
use crate::models::payment::{Payment, PaymentKind};
use crate::models::site::Site;
use crate::models::worker::{Balance, Worker};
use crate::store::DocumentStore;
use crate::utils::date::month_bounds;
use chrono::NaiveDate;

/// Stored ledger figures that disagree with the worker's own history.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrepancy {
    pub worker_id: String,
    pub worker_name: String,
    pub stored: Balance,
    pub derived: Balance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerStatement {
    pub worker: Worker,
    pub attendance: Vec<Attendance>,
    pub payments: Vec<Payment>,
    pub accrued: Money,
    pub paid: Money,
    pub discrepancy: Option<Discrepancy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteTotals {
    pub site: Site,
    pub workers: usize,
    pub active_workers: usize,
    pub pending: Money,
    pub paid: Money,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardTotals {
    pub active_sites: usize,
    pub active_workers: usize,
    pub attendance: usize,
    pub payments: usize,
    pub paid: Money,
    pub pending: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayrollLine {
    pub worker: Worker,
    /// Attendance rows in the month, absences included.
    pub days: usize,
    pub minutes_worked: i64,
    pub gross: Money,
    pub advances: Money,
    pub net: Money,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payroll {
    pub site: Site,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub lines: Vec<PayrollLine>,
}

impl Payroll {
    pub fn total_gross(&self) -> Money {
        self.lines.iter().map(|l| l.gross).sum()
    }

    pub fn total_advances(&self) -> Money {
        self.lines.iter().map(|l| l.advances).sum()
    }

    pub fn total_net(&self) -> Money {
        self.lines.iter().map(|l| l.net).sum()
    }
}

fn derive_balance(attendance: &[Attendance], payments: &[Payment]) -> (Money, Money) {
    let accrued: Money = attendance.iter().map(|a| a.wage_earned).sum();
    let paid: Money = payments.iter().map(|p| p.amount).sum();
    (accrued, paid)
}

fn discrepancy(worker: &Worker, accrued: Money, paid: Money) -> Option<Discrepancy> {
    let derived = Balance::new(accrued - paid, paid);
    let stored = worker.balance();
    (stored != derived).then(|| Discrepancy {
        worker_id: worker.id.clone(),
        worker_name: worker.name.clone(),
        stored,
        derived,
    })
}

impl<S: DocumentStore> Ledger<S> {
    pub fn worker_statement(&self, worker_id: &str) -> AppResult<WorkerStatement> {
        let worker = self.worker(worker_id)?;
        let attendance = self.attendance_for_worker(worker_id)?;
        let payments = self.payments_for_worker(worker_id)?;

        let (accrued, paid) = derive_balance(&attendance, &payments);
        let discrepancy = discrepancy(&worker, accrued, paid);

        Ok(WorkerStatement {
            worker,
            attendance,
            payments,
            accrued,
            paid,
            discrepancy,
        })
    }

    /// Every worker whose stored balance differs from Σ wages − Σ payments.
    pub fn reconcile_all(&self) -> AppResult<Vec<Discrepancy>> {
        let attendance = self.fetch_all::<Attendance>()?;
        let payments = self.fetch_all::<Payment>()?;

        let mut out = Vec::new();
        for worker in self.workers()? {
            let mine_a: Vec<Attendance> = attendance
                .iter()
                .filter(|a| a.worker_id == worker.id)
                .cloned()
                .collect();
            let mine_p: Vec<Payment> = payments
                .iter()
                .filter(|p| p.worker_id == worker.id)
                .cloned()
                .collect();
            let (accrued, paid) = derive_balance(&mine_a, &mine_p);
            if let Some(d) = discrepancy(&worker, accrued, paid) {
                out.push(d);
            }
        }
        Ok(out)
    }

    pub fn site_totals(&self, site_id: &str) -> AppResult<SiteTotals> {
        let site = self.site(site_id)?;
        let workers = self.workers_for_site(site_id)?;

        Ok(SiteTotals {
            site,
            workers: workers.len(),
            active_workers: workers.iter().filter(|w| w.is_active).count(),
            pending: workers.iter().map(|w| w.pending_amount).sum(),
            paid: workers.iter().map(|w| w.paid_amount).sum(),
        })
    }

    pub fn dashboard_totals(&self) -> AppResult<DashboardTotals> {
        let sites = self.sites(false)?;
        let workers = self.workers()?;

        Ok(DashboardTotals {
            active_sites: sites.len(),
            active_workers: workers.iter().filter(|w| w.is_active).count(),
            attendance: self.fetch_all::<Attendance>()?.len(),
            payments: self.fetch_all::<Payment>()?.len(),
            paid: workers.iter().map(|w| w.paid_amount).sum(),
            pending: workers.iter().map(|w| w.pending_amount).sum(),
        })
    }

    /// Monthly payroll for the active workers of a site.
    ///
    /// Gross is what the month's attendance accrued; advances paid inside
    /// the month are deducted to give net.
    pub fn payroll(&self, site_id: &str, year: i32, month: u32) -> AppResult<Payroll> {
        let site = self.site(site_id)?;
        let (from, to) = month_bounds(year, month)?;
        let in_month = |d: NaiveDate| d >= from && d <= to;

        let attendance: Vec<Attendance> = self
            .fetch_by::<Attendance>("siteId", site_id)?
            .into_iter()
            .filter(|a| in_month(a.date))
            .collect();
        let payments: Vec<Payment> = self
            .fetch_by::<Payment>("siteId", site_id)?
            .into_iter()
            .filter(|p| in_month(p.date))
            .collect();

        let mut lines = Vec::new();
        for worker in self.workers_for_site(site_id)? {
            if !worker.is_active {
                continue;
            }

            let rows: Vec<&Attendance> = attendance
                .iter()
                .filter(|a| a.worker_id == worker.id)
                .collect();

            let gross: Money = rows.iter().map(|a| a.wage_earned).sum();
            let advances: Money = payments
                .iter()
                .filter(|p| p.worker_id == worker.id && p.kind == PaymentKind::Advance)
                .map(|p| p.amount)
                .sum();

            let mut warnings = Vec::new();
            if rows.iter().any(|a| a.incomplete) {
                warnings.push("Missing check-out times".to_string());
            }
            if rows.iter().all(|a| a.status == AttendanceStatus::Absent) && !rows.is_empty() {
                warnings.push("No days worked".to_string());
            }

            lines.push(PayrollLine {
                days: rows.len(),
                minutes_worked: rows.iter().filter_map(|a| a.minutes_worked).sum(),
                gross,
                advances,
                net: gross - advances,
                warnings,
                worker,
            });
        }

        Ok(Payroll {
            site,
            from,
            to,
            lines,
        })
    }
}
