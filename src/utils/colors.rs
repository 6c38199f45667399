/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Attendance status color: present green, half-day yellow, absent red.
pub fn color_for_status(status: &str) -> &'static str {
    match status {
        "present" => GREEN,
        "half-day" => YELLOW,
        "absent" => RED,
        _ => RESET,
    }
}

/// Returns GREY when the field is empty (None or "" or "--:--"),
/// and RESET otherwise.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--:--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
