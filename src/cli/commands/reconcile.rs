use crate::cli::commands::open_ledger;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::reconcile::Discrepancy;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::formatting::money;

fn report(cur: &str, d: &Discrepancy) {
    warning(format!(
        "{} ({}): stored pending {} / paid {}, history gives pending {} / paid {}",
        d.worker_name,
        d.worker_id,
        money(cur, d.stored.pending),
        money(cur, d.stored.paid),
        money(cur, d.derived.pending),
        money(cur, d.derived.paid)
    ));
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Reconcile { worker } = cmd {
        let ledger = open_ledger(cfg)?;
        let cur = cfg.currency_symbol.as_str();

        let found: Vec<Discrepancy> = match worker {
            Some(id) => ledger.worker_statement(id)?.discrepancy.into_iter().collect(),
            None => ledger.reconcile_all()?,
        };

        if found.is_empty() {
            success("All balances match attendance and payment history.");
        } else {
            for d in &found {
                report(cur, d);
            }
            warning(format!("{} worker(s) out of balance", found.len()));
        }
    }

    Ok(())
}
