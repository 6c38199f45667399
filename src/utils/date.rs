use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse an optional `YYYY-MM-DD`, defaulting to today.
pub fn parse_date_or_today(input: Option<&String>) -> AppResult<NaiveDate> {
    match input {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string())),
        None => Ok(today()),
    }
}

/// Parse `YYYY-MM` into (year, month).
pub fn parse_month(s: &str) -> Option<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()?;
    Some((d.year(), d.month()))
}

pub fn current_month() -> (i32, u32) {
    let t = today();
    (t.year(), t.month())
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::InvalidDate(format!("{year}-{month:02}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::InvalidDate(format!("{year}-{month:02}")))?;

    let last = next
        .pred_opt()
        .ok_or_else(|| AppError::InvalidDate(format!("{year}-{month:02}")))?;
    Ok((first, last))
}

/// Number of days in the calendar month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    month_bounds(date.year(), date.month())
        .map(|(_, last)| last.day())
        .unwrap_or(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths() {
        let d = |y, m| NaiveDate::from_ymd_opt(y, m, 15).unwrap();
        assert_eq!(days_in_month(d(2025, 9)), 30);
        assert_eq!(days_in_month(d(2025, 12)), 31);
        assert_eq!(days_in_month(d(2024, 2)), 29);
        assert_eq!(days_in_month(d(2025, 2)), 28);
    }

    #[test]
    fn parses_months() {
        assert_eq!(parse_month("2025-09"), Some((2025, 9)));
        assert_eq!(parse_month("2025-13"), None);
        assert_eq!(parse_month("sept"), None);
    }

    #[test]
    fn bounds_of_december() {
        let (first, last) = month_bounds(2025, 12).unwrap();
        assert_eq!(first.to_string(), "2025-12-01");
        assert_eq!(last.to_string(), "2025-12-31");
        assert!(month_bounds(2025, 0).is_err());
    }
}
