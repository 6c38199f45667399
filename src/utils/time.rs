//! Time utilities: parsing HH:MM, shift durations, formatting minutes.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;

const MINUTES_PER_DAY: i64 = 24 * 60;

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

/// Minutes between check-in and check-out. A check-out earlier than the
/// check-in is an overnight shift and wraps past midnight.
pub fn shift_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let mins = (end - start).num_minutes();
    if mins < 0 { mins + MINUTES_PER_DAY } else { mins }
}

pub fn format_minutes(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

pub fn parse_optional_time(input: Option<&String>) -> AppResult<Option<NaiveTime>> {
    if let Some(s) = input {
        let t = parse_time(s).ok_or_else(|| AppError::InvalidTime(s.to_string()))?;
        Ok(Some(t))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_day_and_overnight_shifts() {
        let t = |s| parse_time(s).unwrap();
        assert_eq!(shift_minutes(t("09:00"), t("17:30")), 510);
        assert_eq!(shift_minutes(t("22:00"), t("06:00")), 480);
        assert_eq!(shift_minutes(t("09:00"), t("09:00")), 0);
    }

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_minutes(510), "08:30");
        assert_eq!(format_minutes(-45), "-00:45");
    }

    #[test]
    fn optional_time_rejects_garbage() {
        assert!(parse_optional_time(Some(&"9am".to_string())).is_err());
        assert_eq!(parse_optional_time(None).unwrap(), None);
    }
}
