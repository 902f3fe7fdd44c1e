//! Output management and formatting for stdout.
//!
//! Tracing and error reports go to stderr; everything a user might pipe
//! (tables, help text, JSON) goes through [`OutputManager`].

use std::io;

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::global::GlobalArgs;
use crate::error::{CliResult, IntoCli};

/// Manages CLI output based on global flags.
pub struct OutputManager {
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags.
    ///
    /// Colour is off when `--no-color`/`NO_COLOR` is given or stdout is
    /// not a terminal.
    pub fn new(args: &GlobalArgs) -> Self {
        let term = Term::stdout();
        Self {
            quiet: args.quiet,
            no_color: args.no_color || !term.is_term(),
            term,
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Payload output (help text, JSON). Never suppressed: it is the
    /// answer to the command, not commentary.
    pub fn payload(&self, text: &str) -> io::Result<()> {
        self.term.write_str(text)?;
        if !text.ends_with('\n') {
            self.term.write_line("")?;
        }
        Ok(())
    }

    /// Serialize `value` as JSON and write it as payload.
    pub fn json<T: Serialize>(&self, value: &T, compact: bool) -> CliResult<()> {
        let text = if compact {
            serde_json::to_string(value)
        } else {
            serde_json::to_string_pretty(value)
        }
        .with_cli_context(|| "rendering JSON output")?;
        self.payload(&text)
            .with_cli_context(|| "writing JSON to stdout")
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Dimmed note, e.g. a placeholder when a column is empty.
    pub fn dim(&self, text: &str) -> String {
        if self.no_color {
            text.to_owned()
        } else {
            text.dimmed().to_string()
        }
    }

    /// Highlighted flag column.
    pub fn flag(&self, text: &str) -> String {
        if self.no_color {
            text.to_owned()
        } else {
            text.green().to_string()
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
