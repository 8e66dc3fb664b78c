//! Persistent status line display

use chatty_core::{Capability, Session};
use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand, QueueableCommand,
};
use std::io::{stdout, Write};
use std::path::Path;

/// ANSI color codes for status display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusColors {
    /// Foreground color ANSI code
    pub fg: &'static str,
    /// Background color ANSI code
    pub bg: &'static str,
}

impl StatusColors {
    /// Yellow text on dark yellow background (last command failed)
    pub const WARNING: Self = Self {
        fg: "\x1b[33m",
        bg: "\x1b[48;5;58m",
    };

    /// White text on gray background (normal)
    pub const NORMAL: Self = Self {
        fg: "\x1b[37m",
        bg: "\x1b[48;5;236m",
    };
}

/// Select colors from the last exit code
pub fn select_status_colors(last_exit_code: Option<i32>) -> StatusColors {
    match last_exit_code {
        Some(code) if code != 0 => StatusColors::WARNING,
        _ => StatusColors::NORMAL,
    }
}

/// Format the status text
pub fn format_status(
    cwd: &Path,
    history_granted: bool,
    commands_run: usize,
    last_exit_code: Option<i32>,
) -> String {
    let consent = if history_granted {
        "granted"
    } else {
        "not granted"
    };
    let mut text = format!(
        "  {} · history lookup: {} · {} commands",
        cwd.display(),
        consent,
        commands_run
    );
    if let Some(code) = last_exit_code.filter(|c| *c != 0) {
        text.push_str(&format!(" · last exit {}", code));
    }
    text
}

/// Update persistent status line at bottom of terminal
pub fn update_status_line(session: &Session, last_exit_code: Option<i32>) {
    let Ok((width, height)) = terminal::size() else {
        return;
    };

    let mut stdout = stdout();

    let colors = select_status_colors(last_exit_code);
    let status_text = format_status(
        session.working_dir(),
        session.consent().has_consent(Capability::HistoryLookup),
        session.session_history().len(),
        last_exit_code,
    );

    let _ = stdout.queue(cursor::SavePosition);
    let _ = stdout.queue(cursor::MoveTo(0, height.saturating_sub(1)));

    let _ = write!(stdout, "{}{}", colors.bg, colors.fg);
    let _ = write!(stdout, "{}", status_text);

    // Fill rest of line with background color
    let padding = (width as usize).saturating_sub(status_text.chars().count());
    if padding > 0 {
        let _ = write!(stdout, "{}", " ".repeat(padding));
    }

    let _ = write!(stdout, "\x1b[0m");
    let _ = stdout.queue(cursor::RestorePosition);
    let _ = stdout.flush();
}

/// Clear the persistent status line
pub fn clear_status_line() {
    if let Ok((_, height)) = terminal::size() {
        let mut stdout = stdout();
        let _ = stdout.queue(cursor::SavePosition);
        let _ = stdout.queue(cursor::MoveTo(0, height.saturating_sub(1)));
        let _ = stdout.execute(terminal::Clear(ClearType::CurrentLine));
        let _ = stdout.queue(cursor::RestorePosition);
        let _ = stdout.flush();
    }
}
