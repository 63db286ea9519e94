//! ANSI color helpers for pretty terminal output
//!
//! Simple, tasteful colors that work on most terminals.

use crate::personas::Theme;

/// ANSI escape codes
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";

    // Colors
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

use ansi::*;

/// Terminal accent for a persona theme, keyed on the card button color.
/// Anything unrecognized falls back to cyan.
pub fn accent_for(theme: &Theme) -> &'static str {
    match theme.button.to_uppercase().as_str() {
        "#3B82F6" => BLUE,
        "#FB923C" => YELLOW,
        "#6366F1" => MAGENTA,
        "#22C55E" => GREEN,
        _ => CYAN,
    }
}

/// Format a persona name in its accent color
pub fn persona_name(theme: &Theme, name: &str) -> String {
    format!("{}{}{}{}", BOLD, accent_for(theme), name, RESET)
}

/// Format a role badge (dim, for the selection screen)
pub fn role_badge(role: &str) -> String {
    format!("{}[{}]{}", DIM, role, RESET)
}

/// Format a tagline (italic, dim)
pub fn tagline(text: &str) -> String {
    format!("{}{}{}{}", DIM, ITALIC, text, RESET)
}

/// Format a success message (green)
pub fn success(msg: &str) -> String {
    format!("{}{}{}", GREEN, msg, RESET)
}

/// Format an error message (red)
pub fn error(msg: &str) -> String {
    format!("{}{}{}", RED, msg, RESET)
}

/// Format a warning message (yellow)
pub fn warning(msg: &str) -> String {
    format!("{}{}{}", YELLOW, msg, RESET)
}

/// Format a status/info message (gray/dim)
pub fn status(msg: &str) -> String {
    format!("{}{}{}", GRAY, msg, RESET)
}

/// Format a header (bold)
pub fn header(msg: &str) -> String {
    format!("{}{}{}", BOLD, msg, RESET)
}

/// Format the chat prompt
pub fn prompt() -> String {
    format!("{}{}>>> {}", BOLD, MAGENTA, RESET)
}

/// Format the selection-screen prompt
pub fn select_prompt() -> String {
    format!("{}{}select> {}", BOLD, MAGENTA, RESET)
}

/// Format a horizontal separator
pub fn separator(width: usize) -> String {
    format!("{}{}{}", DIM, "─".repeat(width), RESET)
}

/// Format startup banner line
pub fn banner_line(label: &str, value: &str) -> String {
    format!("{}{:<12}{} {}", DIM, label, RESET, value)
}

/// Format startup banner with accent
pub fn banner_accent(text: &str) -> String {
    format!("{}{}{}{}", BOLD, MAGENTA, text, RESET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_accents_are_distinct() {
        let registry = crate::personas::PersonaRegistry::builtin();
        let accents: Vec<&str> = registry.iter().map(|p| accent_for(&p.theme)).collect();
        let mut deduped = accents.clone();
        deduped.dedup();
        assert_eq!(accents.len(), deduped.len());
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let theme = Theme::default();
        assert_eq!(accent_for(&theme), ansi::CYAN);
    }
}
