//! Monetary amounts held as integer minor units (1/100 of the currency unit).

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `self * num / den`, rounded half away from zero to the minor unit.
    ///
    /// Fails when the result does not fit in the ledger's amount range.
    pub fn mul_ratio(self, num: i64, den: i64) -> AppResult<Money> {
        if den == 0 {
            return Err(AppError::Validation("Division by zero in amount ratio".into()));
        }
        let n = self.0 as i128 * num as i128;
        let d = den as i128;
        let q = n / d;
        let r = n % d;
        let rounded = if 2 * r.abs() >= d.abs() {
            q + if (n < 0) != (d < 0) { -1 } else { 1 }
        } else {
            q
        };
        i64::try_from(rounded)
            .map(Money)
            .map_err(|_| AppError::InvalidAmount(format!("{} × {}/{} is out of range", self, num, den)))
    }

    /// Half of the amount, rounded half away from zero.
    pub fn half(self) -> Money {
        Money(self.0 / 2 + self.0 % 2)
    }

    pub fn checked_add(self, rhs: Money) -> AppResult<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .ok_or_else(|| AppError::InvalidAmount(format!("{} + {} is out of range", self, rhs)))
    }

    pub fn checked_sub(self, rhs: Money) -> AppResult<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .ok_or_else(|| AppError::InvalidAmount(format!("{} - {} is out of range", self, rhs)))
    }

    /// Parse user input such as `800`, `800.5` or `1250.75`.
    pub fn parse(input: &str) -> AppResult<Money> {
        let s = input.trim();
        let invalid = || AppError::InvalidAmount(input.to_string());

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
            || frac.len() > 2
        {
            return Err(invalid());
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let minor = units
            .checked_mul(100)
            .and_then(|m| m.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -minor } else { minor }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// Operators saturate and are meant for report totals. Balance changes
// go through `checked_add`/`checked_sub`.
impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}
