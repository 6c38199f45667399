//! Payment application rule: move a bounded amount from pending to paid.

use crate::errors::{AppError, AppResult};
use crate::models::money::Money;
use crate::models::worker::Balance;

/// Reject amounts the ledger cannot absorb. Runs before any write.
pub fn check_payment(balance: &Balance, amount: Money) -> AppResult<()> {
    if !amount.is_positive() {
        return Err(AppError::Validation(format!(
            "Payment amount must be greater than 0 (got {})",
            amount
        )));
    }
    if amount > balance.pending {
        return Err(AppError::Overpayment {
            requested: amount,
            pending: balance.pending,
        });
    }
    Ok(())
}

/// The balance after paying `amount`.
pub fn apply_payment(balance: &Balance, amount: Money) -> AppResult<Balance> {
    check_payment(balance, amount)?;
    let next = Balance::new(
        balance.pending.checked_sub(amount)?,
        balance.paid.checked_add(amount)?,
    );
    next.check()?;
    Ok(next)
}

/// The balance after accruing `delta` (never negative).
pub fn apply_accrual(balance: &Balance, delta: Money) -> AppResult<Balance> {
    if delta.is_negative() {
        return Err(AppError::Validation(format!(
            "Accrued wage cannot be negative (got {})",
            delta
        )));
    }
    let next = Balance::new(balance.pending.checked_add(delta)?, balance.paid);
    next.check()?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bal(pending: i64, paid: i64) -> Balance {
        Balance::new(Money::from_units(pending), Money::from_units(paid))
    }

    #[test]
    fn payment_moves_amount_from_pending_to_paid() {
        let next = apply_payment(&bal(1200, 300), Money::from_units(500)).unwrap();
        assert_eq!(next, bal(700, 800));
    }

    #[test]
    fn paying_everything_empties_pending() {
        let next = apply_payment(&bal(800, 0), Money::from_units(800)).unwrap();
        assert_eq!(next, bal(0, 800));
    }

    #[test]
    fn overpayment_is_rejected() {
        let err = apply_payment(&bal(800, 0), Money::from_units(801)).unwrap_err();
        match err {
            AppError::Overpayment { requested, pending } => {
                assert_eq!(requested, Money::from_units(801));
                assert_eq!(pending, Money::from_units(800));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert!(matches!(
            apply_payment(&bal(800, 0), Money::ZERO),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            apply_payment(&bal(800, 0), Money::from_units(-5)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn accrual_only_touches_pending() {
        let next = apply_accrual(&bal(100, 50), Money::from_units(400)).unwrap();
        assert_eq!(next, bal(500, 50));
        assert!(apply_accrual(&bal(100, 50), Money::from_units(-1)).is_err());
    }

    #[test]
    fn accrual_past_the_amount_range_is_an_error() {
        let pending = Money::parse("60000000000000000").unwrap();
        let balance = Balance::new(pending, Money::ZERO);
        let err = apply_accrual(&balance, pending).unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount(_)));
    }

    #[test]
    fn payment_past_the_paid_range_is_an_error() {
        let balance = Balance::new(Money::from_units(10), Money::from_minor(i64::MAX));
        let err = apply_payment(&balance, Money::from_units(5)).unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount(_)));
    }
}
