use crate::cli::commands::open_ledger;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::money::Money;
use crate::models::payment::{PaymentKind, PaymentRequest};
use crate::ui::messages::success;
use crate::utils::date::parse_date_or_today;
use crate::utils::formatting::money;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Pay {
        worker,
        amount,
        date,
        method,
        kind,
        notes,
    } = cmd
    {
        let ledger = open_ledger(cfg)?;
        let cur = cfg.currency_symbol.as_str();

        let req = PaymentRequest {
            amount: Money::parse(amount)?,
            date: parse_date_or_today(date.as_ref())?,
            method: method.clone().unwrap_or_default(),
            kind: PaymentKind::from_code(kind)
                .ok_or_else(|| AppError::Validation(format!("Invalid payment kind: {}", kind)))?,
            notes: notes.clone(),
        };

        let outcome = ledger.record_payment(worker, req)?;
        success(format!(
            "Paid {} to {} ({}, {}). Pending {}, paid {}",
            money(cur, outcome.payment.amount),
            outcome.worker.name,
            outcome.payment.kind,
            outcome.payment.method,
            money(cur, outcome.worker.pending_amount),
            money(cur, outcome.worker.paid_amount)
        ));
    }

    Ok(())
}
