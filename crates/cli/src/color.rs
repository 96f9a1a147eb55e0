// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers and job labels: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Placeholders: medium grey
    pub const CONTEXT: u8 = 245;
    /// Job errors: soft red
    pub const ERROR: u8 = 167;
}

/// Whether to colorize a stream that is (or is not) a terminal.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
fn colorize(is_terminal: bool) -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    is_terminal
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !colorize(std::io::stdout().is_terminal()) {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

fn paint(code: u8, text: &str) -> String {
    format!("\x1b[38;5;{code}m{text}\x1b[0m")
}

/// Job label prefix for lines written to stderr.
pub fn label(text: &str) -> String {
    if colorize(std::io::stderr().is_terminal()) {
        paint(codes::HEADER, text)
    } else {
        text.to_string()
    }
}

/// Job error message written to stderr.
pub fn error(text: &str) -> String {
    if colorize(std::io::stderr().is_terminal()) {
        paint(codes::ERROR, text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
