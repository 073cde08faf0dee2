use std::fmt;

use colored::Colorize;

/// Message categories used by the CLI output helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Section,
}

pub fn styled(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Info => text,
        MessageKind::Success => text.green().to_string(),
        MessageKind::Warning => text.yellow().to_string(),
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
    }
}

pub fn info(message: impl fmt::Display) {
    println!("{}", styled(MessageKind::Info, message));
}

pub fn success(message: impl fmt::Display) {
    println!("{}", styled(MessageKind::Success, message));
}

pub fn warning(message: impl fmt::Display) {
    println!("{}", styled(MessageKind::Warning, message));
}

pub fn section(title: impl fmt::Display) {
    println!("{}", styled(MessageKind::Section, title));
}

/// Text progress bar, e.g. `[#####-----]` for one half.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
