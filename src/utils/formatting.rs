//! Formatting utilities used for CLI output.

use crate::models::money::Money;
use crate::utils::colors::{GREEN, GREY, RESET, YELLOW};
use regex::Regex;
use std::sync::OnceLock;

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Drop ANSI escape sequences, leaving the text a terminal would show.
pub fn strip_ansi(s: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[A-Za-z]").ok()) {
        Some(re) => re.replace_all(s, "").into_owned(),
        None => s.to_string(),
    }
}

/// `₹1250.00`, with the configured symbol in front.
pub fn money(symbol: &str, amount: Money) -> String {
    format!("{}{}", symbol, amount)
}

/// Pending balances are highlighted while money is still owed.
pub fn colorize_pending(symbol: &str, amount: Money) -> String {
    if amount.is_positive() {
        format!("{YELLOW}{}{RESET}", money(symbol, amount))
    } else {
        format!("{GREY}{}{RESET}", money(symbol, amount))
    }
}

pub fn colorize_paid(symbol: &str, amount: Money) -> String {
    if amount.is_positive() {
        format!("{GREEN}{}{RESET}", money(symbol, amount))
    } else {
        format!("{GREY}{}{RESET}", money(symbol, amount))
    }
}

/// Short ids keep tables narrow; the full id is always accepted as input.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn active_label(active: bool) -> &'static str {
    if active { "active" } else { "inactive" }
}
