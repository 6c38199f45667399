use crate::cli::commands::open_ledger;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::audit;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::formatting::strip_ansi;
use ansi_term::Colour;

const DETAILS_WIDTH: usize = 70;

fn color_for_action(action: &str) -> Colour {
    match action {
        a if a.starts_with("create_") => Colour::Green,
        a if a.starts_with("delete_") => Colour::Red,
        a if a.starts_with("update_") => Colour::Yellow,
        "payment" => Colour::Cyan,
        "attendance" | "complete_attendance" => Colour::Blue,
        "backup" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Audit { limit } = cmd {
        let ledger = open_ledger(cfg)?;
        let entries = audit::recent(ledger.store(), *limit)?;

        if entries.is_empty() {
            info("Audit log is empty.");
            return Ok(());
        }

        let action_w = entries
            .iter()
            .map(|e| e.action.len())
            .max()
            .unwrap_or(10);

        println!("📜 Audit log:\n");

        for e in entries {
            let when = e.timestamp.format("%FT%T%:z").to_string();
            let painted = color_for_action(&e.action).paint(e.action.as_str()).to_string();
            let padding = " ".repeat(action_w.saturating_sub(strip_ansi(&painted).len()));

            let lines = textwrap::wrap(&e.details, DETAILS_WIDTH);
            let indent = " ".repeat(when.len() + action_w + 6);
            let mut lines = lines.iter();

            println!(
                "{} | {}{} => {}",
                when,
                painted,
                padding,
                lines.next().map(|l| l.to_string()).unwrap_or_default()
            );
            for rest in lines {
                println!("{}{}", indent, rest);
            }
        }
    }

    Ok(())
}
