use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::value_objects::Severity;

/// Timestamp layout of every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Message fragments plus optional structured context.
///
/// Fragments are joined with a single space; fields render as `key=value`
/// after the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    fragments: Vec<String>,
    fields: Vec<(String, String)>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![text.into()],
            fields: Vec::new(),
        }
    }

    /// Append another fragment.
    pub fn and(mut self, fragment: impl fmt::Display) -> Self {
        self.fragments.push(fragment.to_string());
        self
    }

    /// Attach a structured `key=value` field.
    pub fn field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    pub fn text(&self) -> String {
        let mut text = self.fragments.join(" ");
        for (k, v) in &self.fields {
            text.push_str(&format!(" {k}={v}"));
        }
        text
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for Message {
    fn from(s: &String) -> Self {
        Self::new(s.as_str())
    }
}

impl<const N: usize> From<[&str; N]> for Message {
    fn from(parts: [&str; N]) -> Self {
        Self {
            fragments: parts.iter().map(|s| s.to_string()).collect(),
            fields: Vec::new(),
        }
    }
}

impl From<Vec<String>> for Message {
    fn from(fragments: Vec<String>) -> Self {
        Self {
            fragments,
            fields: Vec::new(),
        }
    }
}

/// A single diagnostic record, built and dropped within one log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl LogRecord {
    pub fn new(timestamp: DateTime<Utc>, severity: Severity, message: &Message) -> Self {
        Self {
            timestamp,
            severity,
            message: message.text(),
        }
    }

    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Message lines; an empty message still yields one (empty) line.
    pub fn lines(&self) -> Vec<&str> {
        let lines: Vec<&str> = self.message.lines().collect();
        if lines.is_empty() { vec![""] } else { lines }
    }

    /// Render with a caller-supplied label painter (identity for plain output).
    pub fn render_with<F>(&self, paint_label: F) -> Vec<String>
    where
        F: Fn(Severity, &str) -> String,
    {
        let ts = self.timestamp_label();
        let label = paint_label(self.severity, &self.severity.label());
        self.lines()
            .into_iter()
            .map(|line| format!("{ts} {label} {line}"))
            .collect()
    }

    /// Uncolored rendering.
    pub fn render_plain(&self) -> Vec<String> {
        self.render_with(|_, label| label.to_string())
    }
}
