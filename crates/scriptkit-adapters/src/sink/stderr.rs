//! Production log sink: the process error stream.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::{OwoColorize, Style};

use scriptkit_core::{
    application::{ApplicationError, ports::LogSink},
    domain::{LogRecord, Severity},
};

/// Writes log records and help text to stderr.
#[derive(Debug, Clone)]
pub struct StderrSink {
    term: Term,
    color_capable: bool,
}

impl StderrSink {
    /// Detect color support: stderr must be a terminal and `TERM` not `dumb`.
    pub fn new() -> Self {
        let dumb = std::env::var("TERM").is_ok_and(|t| t == "dumb");
        Self {
            term: Term::stderr(),
            color_capable: io::stderr().is_terminal() && !dumb,
        }
    }

    /// A sink that never colors, whatever the terminal.
    pub fn plain() -> Self {
        Self {
            term: Term::stderr(),
            color_capable: false,
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrSink {
    fn write_record(&self, record: &LogRecord, color: bool) -> Result<(), ApplicationError> {
        let lines = if color && self.color_capable {
            record.render_with(paint_label)
        } else {
            record.render_plain()
        };
        for line in lines {
            self.term.write_line(&line).map_err(sink_error)?;
        }
        Ok(())
    }

    fn write_raw(&self, text: &str) -> Result<(), ApplicationError> {
        self.term.write_str(text).map_err(sink_error)
    }

    fn supports_color(&self) -> bool {
        self.color_capable
    }
}

fn sink_error(e: io::Error) -> ApplicationError {
    ApplicationError::SinkWrite {
        reason: e.to_string(),
    }
}

/// Label style per severity.
pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Debug => Style::new().magenta(),
        Severity::Info => Style::new().green(),
        Severity::Notice => Style::new().blue(),
        Severity::Warning => Style::new().yellow(),
        Severity::Error => Style::new().red(),
        Severity::Critical => Style::new().red().bold(),
        Severity::Alert => Style::new().white().on_red().bold(),
        Severity::Emergency => Style::new().white().on_red().bold().underline().blink(),
    }
}

/// Paint a `[severity]` label.
pub fn paint_label(severity: Severity, label: &str) -> String {
    label.style(severity_style(severity)).to_string()
}
