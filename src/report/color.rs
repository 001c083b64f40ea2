// src/report/color.rs

//! Terminal colours for the report.

use std::io::IsTerminal;

use clap::builder::styling::{AnsiColor, Color, Effects, Style};

/// Decide whether the report on stdout gets colours.
///
/// Priority: `NO_COLOR` (non-empty) disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    colorize_from(
        std::env::var("NO_COLOR").ok().as_deref(),
        std::env::var("COLOR").ok().as_deref(),
        std::io::stdout().is_terminal(),
    )
}

fn colorize_from(no_color: Option<&str>, color: Option<&str>, is_tty: bool) -> bool {
    if no_color.is_some_and(|v| !v.is_empty()) {
        return false;
    }
    if color == Some("1") {
        return true;
    }
    is_tty
}

/// Role of a piece of report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Phase lines, `ok`, `pass:`.
    Good,
    /// `fail:`, `stdout:`, `stderr:` labels.
    Bad,
    /// The `fail: <file>` header of a failure block.
    BadHeader,
    Warn,
    /// `testing concluded`.
    Heading,
    /// `run:` / `ran:` command echo.
    Echo,
}

impl Tone {
    fn style(self) -> Style {
        let fg = |c: AnsiColor| Style::new().fg_color(Some(Color::Ansi(c)));
        match self {
            Tone::Good => fg(AnsiColor::BrightGreen),
            Tone::Bad => fg(AnsiColor::BrightRed),
            Tone::BadHeader => fg(AnsiColor::BrightRed).effects(Effects::UNDERLINE),
            Tone::Warn => fg(AnsiColor::BrightYellow),
            Tone::Heading => fg(AnsiColor::BrightMagenta),
            Tone::Echo => fg(AnsiColor::BrightBlue),
        }
    }
}

/// Wrap `text` in the escape codes for `tone`, or return it unchanged.
pub fn paint(text: &str, tone: Tone, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    let style = tone.style();
    format!("{}{}{}", style.render(), text, style.render_reset())
}
