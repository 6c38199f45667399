//! Wage accrual rule: one attendance event → one non-negative wage delta.

use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceMark, AttendanceStatus};
use crate::models::money::Money;
use crate::models::worker::{WagePolicy, WageType};
use crate::utils::date::days_in_month;
use crate::utils::time::shift_minutes;
use chrono::NaiveDate;

/// What an attendance event is worth under a wage policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    pub delta: Money,
    pub minutes_worked: Option<i64>,
    /// Hourly shift without a check-out: nothing accrued yet.
    pub incomplete: bool,
}

impl Accrual {
    fn flat(delta: Money) -> Self {
        Self {
            delta,
            minutes_worked: None,
            incomplete: false,
        }
    }
}

/// Compute the wage delta for `mark` on `date`.
///
/// - daily: full rate when present, half when half-day, nothing when absent
/// - hourly: worked minutes × rate / 60; a missing check-out accrues 0 and
///   flags the record incomplete
/// - monthly: rate / days of the calendar month per present day
pub fn wage_delta(policy: &WagePolicy, mark: &AttendanceMark, date: NaiveDate) -> AppResult<Accrual> {
    policy.validate()?;

    if mark.status == AttendanceStatus::Absent {
        return Ok(Accrual::flat(Money::ZERO));
    }

    match policy.wage_type {
        WageType::Daily => Ok(Accrual::flat(match mark.status {
            AttendanceStatus::HalfDay => policy.wage_amount.half(),
            _ => policy.wage_amount,
        })),

        WageType::Hourly => {
            let time_in = mark.time_in.ok_or_else(|| {
                AppError::Validation("Hourly attendance requires a check-in time".into())
            })?;

            match mark.time_out {
                None => Ok(Accrual {
                    delta: Money::ZERO,
                    minutes_worked: None,
                    incomplete: true,
                }),
                Some(time_out) => {
                    let minutes = shift_minutes(time_in, time_out);
                    if minutes == 0 {
                        return Err(AppError::InvalidTime(
                            "Check-out must differ from check-in".into(),
                        ));
                    }
                    Ok(Accrual {
                        delta: policy.wage_amount.mul_ratio(minutes, 60)?,
                        minutes_worked: Some(minutes),
                        incomplete: false,
                    })
                }
            }
        }

        WageType::Monthly => {
            let per_day = policy
                .wage_amount
                .mul_ratio(1, days_in_month(date) as i64)?;
            Ok(Accrual::flat(match mark.status {
                AttendanceStatus::HalfDay => per_day.half(),
                _ => per_day,
            }))
        }
    }
}
