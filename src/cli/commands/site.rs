use crate::cli::commands::open_ledger;
use crate::cli::parser::{Commands, SiteAction};
use crate::config::Config;
use crate::core::ledger::SiteUpdate;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::formatting::{active_label, colorize_paid, colorize_pending, money, short_id};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Site { action } = cmd else {
        return Ok(());
    };
    let ledger = open_ledger(cfg)?;
    let cur = cfg.currency_symbol.as_str();

    match action {
        SiteAction::Add { name, address } => {
            let site = ledger.add_site(name, address)?;
            success(format!("Site '{}' created (id {})", site.name, site.id));
        }

        SiteAction::List { all } => {
            let sites = ledger.sites(*all)?;
            if sites.is_empty() {
                info("No sites found.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::left("ID"),
                Column::left("Name"),
                Column::left("Address"),
                Column::left("Status"),
                Column::right("Workers"),
                Column::right("Pending"),
                Column::right("Paid"),
            ]);
            for site in sites {
                let totals = ledger.site_totals(&site.id)?;
                table.add_row(vec![
                    short_id(&site.id).to_string(),
                    site.name.clone(),
                    site.address.clone(),
                    active_label(site.is_active).to_string(),
                    totals.workers.to_string(),
                    colorize_pending(cur, totals.pending),
                    colorize_paid(cur, totals.paid),
                ]);
            }
            print!("{}", table.render());
        }

        SiteAction::Show { id } => {
            let totals = ledger.site_totals(id)?;
            let site = &totals.site;

            println!("🏗️  {} ({})", site.name, active_label(site.is_active));
            println!("   id:      {}", site.id);
            if !site.address.is_empty() {
                println!("   address: {}", site.address);
            }
            println!("   created: {}", site.created_at.format("%Y-%m-%d"));
            println!(
                "   workers: {} ({} active)",
                totals.workers, totals.active_workers
            );
            println!("   pending: {}", money(cur, totals.pending));
            println!("   paid:    {}", money(cur, totals.paid));
        }

        SiteAction::Edit {
            id,
            name,
            address,
            active,
        } => {
            let site = ledger.update_site(
                id,
                SiteUpdate {
                    name: name.clone(),
                    address: address.clone(),
                    is_active: *active,
                },
            )?;
            success(format!("Site '{}' updated", site.name));
        }

        SiteAction::Del { id } => {
            let summary = ledger.delete_site(id)?;
            warning(format!(
                "Site deleted with {} workers, {} attendance records and {} payments",
                summary.workers, summary.attendance, summary.payments
            ));
        }
    }

    Ok(())
}
