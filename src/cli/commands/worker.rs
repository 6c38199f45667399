use crate::cli::commands::open_ledger;
use crate::cli::parser::{Commands, WorkerAction};
use crate::config::Config;
use crate::core::ledger::{NewWorker, WorkerUpdate};
use crate::errors::{AppError, AppResult};
use crate::models::money::Money;
use crate::models::worker::{WagePolicy, WageType};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{color_for_status, colorize_optional, RESET};
use crate::utils::formatting::{active_label, colorize_paid, colorize_pending, money, short_id};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_minutes;

fn parse_wage_type(s: &str) -> AppResult<WageType> {
    WageType::from_code(s).ok_or_else(|| AppError::InvalidWageType(s.to_string()))
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Worker { action } = cmd else {
        return Ok(());
    };
    let ledger = open_ledger(cfg)?;
    let cur = cfg.currency_symbol.as_str();

    match action {
        WorkerAction::Add {
            site,
            name,
            phone,
            wage_type,
            wage,
        } => {
            let policy = WagePolicy::new(parse_wage_type(wage_type)?, Money::parse(wage)?);
            let worker = ledger.add_worker(NewWorker {
                site_id: site.clone(),
                name: name.clone(),
                phone: phone.clone(),
                policy,
            })?;
            success(format!(
                "Worker '{}' added at {}{} per {} (id {})",
                worker.name,
                cur,
                worker.wage_amount,
                worker.wage_type.unit(),
                worker.id
            ));
        }

        WorkerAction::List { site } => {
            let workers = match site {
                Some(id) => ledger.workers_for_site(id)?,
                None => ledger.workers()?,
            };
            if workers.is_empty() {
                info("No workers found.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::left("ID"),
                Column::left("Name"),
                Column::left("Phone"),
                Column::left("Wage"),
                Column::left("Status"),
                Column::right("Pending"),
                Column::right("Paid"),
            ]);
            for w in workers {
                table.add_row(vec![
                    short_id(&w.id).to_string(),
                    w.name.clone(),
                    w.phone.clone(),
                    format!("{}/{}", money(cur, w.wage_amount), w.wage_type.unit()),
                    active_label(w.is_active).to_string(),
                    colorize_pending(cur, w.pending_amount),
                    colorize_paid(cur, w.paid_amount),
                ]);
            }
            print!("{}", table.render());
        }

        WorkerAction::Show { id } => {
            let st = ledger.worker_statement(id)?;
            let w = &st.worker;

            header(format!("👷 {} ({})", w.name, active_label(w.is_active)));
            println!("   id:      {}", w.id);
            println!("   site:    {}", w.site_id);
            if !w.phone.is_empty() {
                println!("   phone:   {}", w.phone);
            }
            println!(
                "   wage:    {} per {} ({})",
                money(cur, w.wage_amount),
                w.wage_type.unit(),
                w.wage_type
            );
            println!("   pending: {}", colorize_pending(cur, w.pending_amount));
            println!("   paid:    {}", colorize_paid(cur, w.paid_amount));

            if !st.attendance.is_empty() {
                println!("\n📅 Attendance:");
                let mut table = Table::new(vec![
                    Column::left("ID"),
                    Column::left("Date"),
                    Column::left("Status"),
                    Column::left("In"),
                    Column::left("Out"),
                    Column::right("Hours"),
                    Column::right("Earned"),
                ]);
                for a in &st.attendance {
                    let hhmm = |t: Option<chrono::NaiveTime>| {
                        t.map(|t| t.format("%H:%M").to_string())
                            .unwrap_or_else(|| "--:--".to_string())
                    };
                    table.add_row(vec![
                        short_id(&a.id).to_string(),
                        a.date.to_string(),
                        format!("{}{}{}", color_for_status(a.status.as_str()), a.status, RESET),
                        colorize_optional(&hhmm(a.time_in)),
                        colorize_optional(&hhmm(a.time_out)),
                        a.minutes_worked.map(format_minutes).unwrap_or_default(),
                        money(cur, a.wage_earned),
                    ]);
                }
                print!("{}", table.render());
            }

            if !st.payments.is_empty() {
                println!("\n💰 Payments:");
                let mut table = Table::new(vec![
                    Column::left("Date"),
                    Column::left("Kind"),
                    Column::left("Method"),
                    Column::right("Amount"),
                    Column::left("Notes"),
                ]);
                for p in &st.payments {
                    table.add_row(vec![
                        p.date.to_string(),
                        p.kind.to_string(),
                        p.method.clone(),
                        money(cur, p.amount),
                        p.notes.clone().unwrap_or_default(),
                    ]);
                }
                print!("{}", table.render());
            }

            if let Some(d) = &st.discrepancy {
                warning(format!(
                    "Stored balance (pending {}, paid {}) differs from history (pending {}, paid {})",
                    d.stored.pending, d.stored.paid, d.derived.pending, d.derived.paid
                ));
            }
        }

        WorkerAction::Edit {
            id,
            name,
            phone,
            wage_type,
            wage,
            active,
        } => {
            let worker = ledger.update_worker(
                id,
                WorkerUpdate {
                    name: name.clone(),
                    phone: phone.clone(),
                    wage_type: wage_type.as_deref().map(parse_wage_type).transpose()?,
                    wage_amount: wage.as_deref().map(Money::parse).transpose()?,
                    is_active: *active,
                },
            )?;
            success(format!("Worker '{}' updated", worker.name));
        }

        WorkerAction::Del { id } => {
            let summary = ledger.delete_worker(id)?;
            warning(format!(
                "Worker deleted with {} attendance records and {} payments",
                summary.attendance, summary.payments
            ));
        }
    }

    Ok(())
}
