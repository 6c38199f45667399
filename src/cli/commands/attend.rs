use crate::cli::commands::open_ledger;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceMark, AttendanceStatus};
use crate::ui::messages::{success, warning};
use crate::utils::date::parse_date_or_today;
use crate::utils::formatting::money;
use crate::utils::time::{format_minutes, parse_optional_time};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Attend {
        worker,
        date,
        status,
        time_in,
        time_out,
        complete,
    } = cmd
    {
        let ledger = open_ledger(cfg)?;
        let cur = cfg.currency_symbol.as_str();

        let time_out = parse_optional_time(time_out.as_ref())?;

        let outcome = if let Some(attendance_id) = complete {
            let record = ledger.attendance(attendance_id)?;
            if record.worker_id != *worker {
                return Err(AppError::Validation(format!(
                    "Attendance {} does not belong to worker {}",
                    attendance_id, worker
                )));
            }
            let out = time_out.ok_or_else(|| {
                AppError::Validation("--complete requires a check-out time (--out)".into())
            })?;
            ledger.complete_attendance(attendance_id, out)?
        } else {
            let status = AttendanceStatus::from_code(status)
                .ok_or_else(|| AppError::InvalidStatus(status.to_string()))?;
            let mark = AttendanceMark {
                status,
                time_in: parse_optional_time(time_in.as_ref())?,
                time_out,
            };
            let date = parse_date_or_today(date.as_ref())?;
            ledger.record_attendance(worker, date, mark)?
        };

        let a = &outcome.attendance;
        let worked = a
            .minutes_worked
            .map(|m| format!(" ({} h)", format_minutes(m)))
            .unwrap_or_default();

        success(format!(
            "{} {} on {}{}: +{}, pending {}",
            outcome.worker.name,
            a.status,
            a.date,
            worked,
            money(cur, outcome.delta),
            money(cur, outcome.worker.pending_amount)
        ));

        if a.incomplete {
            warning(format!(
                "No check-out recorded, nothing accrued yet. Complete it with: attend {} --complete {} --out HH:MM",
                outcome.worker.id, a.id
            ));
        }
    }

    Ok(())
}
