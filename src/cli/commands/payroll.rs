use crate::cli::commands::open_ledger;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{header, info, warning};
use crate::utils::date::{current_month, parse_month};
use crate::utils::formatting::{bold, money};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_minutes;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Payroll { site, month } = cmd {
        let (year, month) = match month {
            Some(m) => parse_month(m).ok_or_else(|| AppError::InvalidDate(m.to_string()))?,
            None => current_month(),
        };

        let ledger = open_ledger(cfg)?;
        let cur = cfg.currency_symbol.as_str();
        let payroll = ledger.payroll(site, year, month)?;

        header(format!(
            "📋 Payroll: {} ({} → {})",
            payroll.site.name, payroll.from, payroll.to
        ));

        if payroll.lines.is_empty() {
            info("No active workers on this site.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::left("Worker"),
            Column::left("Wage"),
            Column::right("Days"),
            Column::right("Hours"),
            Column::right("Gross"),
            Column::right("Advances"),
            Column::right("Net"),
        ]);
        for line in &payroll.lines {
            table.add_row(vec![
                line.worker.name.clone(),
                line.worker.wage_type.to_string(),
                line.days.to_string(),
                if line.minutes_worked > 0 {
                    format_minutes(line.minutes_worked)
                } else {
                    String::new()
                },
                money(cur, line.gross),
                money(cur, line.advances),
                money(cur, line.net),
            ]);
        }
        table.add_row(vec![
            bold("Total"),
            String::new(),
            String::new(),
            String::new(),
            money(cur, payroll.total_gross()),
            money(cur, payroll.total_advances()),
            money(cur, payroll.total_net()),
        ]);
        print!("{}", table.render());

        for line in &payroll.lines {
            for w in &line.warnings {
                warning(format!("{}: {}", line.worker.name, w));
            }
        }
    }

    Ok(())
}
