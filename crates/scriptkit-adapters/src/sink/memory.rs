//! In-memory log sink for testing.

use std::sync::{Arc, RwLock};

use scriptkit_core::{
    application::{ApplicationError, ports::LogSink},
    domain::LogRecord,
};

use super::stderr::paint_label;

/// In-memory sink that keeps every rendered line.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<RwLock<Vec<String>>>,
    color_capable: bool,
}

impl MemorySink {
    /// Create a new empty, color-incapable sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts colored output.
    pub fn with_color() -> Self {
        Self {
            color_capable: true,
            ..Self::default()
        }
    }

    /// All lines written so far (testing helper).
    pub fn lines(&self) -> Vec<String> {
        self.inner.read().map(|l| l.clone()).unwrap_or_default()
    }

    /// Everything written, newline-joined.
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut lines) = self.inner.write() {
            lines.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn write_record(&self, record: &LogRecord, color: bool) -> Result<(), ApplicationError> {
        let rendered = if color && self.color_capable {
            record.render_with(paint_label)
        } else {
            record.render_plain()
        };
        self.inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned { name: "memory sink" })?
            .extend(rendered);
        Ok(())
    }

    fn write_raw(&self, text: &str) -> Result<(), ApplicationError> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned { name: "memory sink" })?
            .extend(text.lines().map(str::to_string));
        Ok(())
    }

    fn supports_color(&self) -> bool {
        self.color_capable
    }
}
