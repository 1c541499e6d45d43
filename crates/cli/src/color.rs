// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::IsTerminal;

pub mod codes {
    /// Section headers: pastel cyan / steel blue
    pub const HEADER: u8 = 74;
    /// Muted / secondary text: darker grey
    pub const MUTED: u8 = 240;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if crate::env::no_color() {
        return false;
    }
    if crate::env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

fn paint(start: &str, text: &str) -> String {
    if should_colorize() {
        format!("{start}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Format text with the header color (steel blue).
pub fn header(text: &str) -> String {
    paint(&fg256(codes::HEADER), text)
}

/// Format text with the muted color (darker grey).
pub fn muted(text: &str) -> String {
    paint(&fg256(codes::MUTED), text)
}

pub fn green(text: &str) -> String {
    paint("\x1b[32m", text)
}

pub fn yellow(text: &str) -> String {
    paint("\x1b[33m", text)
}

pub fn red(text: &str) -> String {
    paint("\x1b[31m", text)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
