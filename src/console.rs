// src/console.rs

//! User-facing session log.
//!
//! The orchestrator writes through the [`LogSink`] surface: `clear` starts a
//! new screen, `log` adds lines, `render` shows them. [`ConsoleLog`] draws
//! to the terminal with `crossterm`; lines logged outside a
//! `clear`..`render` batch (runtime output, exit notices) are printed right
//! away below the current screen.

use std::io::{stdout, Write};

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream::Stdout};

/// Where the session log goes.
pub trait LogSink: Send {
    fn clear(&mut self);
    fn log(&mut self, message: &str);
    fn render(&mut self);
}

/// Terminal implementation of [`LogSink`].
#[derive(Debug)]
pub struct ConsoleLog {
    lines: Vec<String>,
    batching: bool,
    /// Raw mode disables output post-processing, so we emit `\r\n`.
    raw_mode: bool,
    footer: Option<String>,
}

impl ConsoleLog {
    pub fn new(raw_mode: bool) -> Self {
        Self {
            lines: Vec::new(),
            batching: false,
            raw_mode,
            footer: None,
        }
    }

    /// Line shown at the bottom of every rendered screen (key help).
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    fn newline(&self) -> &'static str {
        if self.raw_mode { "\r\n" } else { "\n" }
    }

    fn write_line(&self, out: &mut impl Write, line: &str) {
        let nl = self.newline();
        for part in line.split('\n') {
            write!(out, "{part}{nl}").ok();
        }
    }
}

impl LogSink for ConsoleLog {
    fn clear(&mut self) {
        self.lines.clear();
        self.batching = true;
    }

    fn log(&mut self, message: &str) {
        if self.batching {
            self.lines.push(message.to_string());
            return;
        }
        let mut out = stdout().lock();
        self.write_line(&mut out, message);
        out.flush().ok();
    }

    fn render(&mut self) {
        let mut out = stdout().lock();
        execute!(out, Clear(ClearType::All), cursor::MoveTo(0, 0)).ok();
        for line in &self.lines {
            self.write_line(&mut out, line);
        }
        if let Some(footer) = &self.footer {
            let nl = self.newline();
            write!(out, "{nl}").ok();
            let footer = footer.if_supports_color(Stdout, |t| t.dimmed()).to_string();
            self.write_line(&mut out, &footer);
        }
        out.flush().ok();
        self.batching = false;
    }
}
