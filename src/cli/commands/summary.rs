use crate::cli::commands::open_ledger;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, RESET};
use crate::utils::formatting::{colorize_paid, colorize_pending};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Summary = cmd {
        let ledger = open_ledger(cfg)?;
        let cur = cfg.currency_symbol.as_str();
        let t = ledger.dashboard_totals()?;

        println!("{}• Active sites:{}      {}", CYAN, RESET, t.active_sites);
        println!("{}• Active workers:{}    {}", CYAN, RESET, t.active_workers);
        println!("{}• Attendance records:{} {}", CYAN, RESET, t.attendance);
        println!("{}• Payments:{}          {}", CYAN, RESET, t.payments);
        println!("{}• Total paid:{}        {}", CYAN, RESET, colorize_paid(cur, t.paid));
        println!("{}• Total pending:{}     {}", CYAN, RESET, colorize_pending(cur, t.pending));
    }

    Ok(())
}
