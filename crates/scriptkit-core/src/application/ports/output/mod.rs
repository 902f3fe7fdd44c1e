//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the scaffold needs from the process it runs in.
//! The `scriptkit-adapters` crate provides implementations.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::application::ApplicationError;
use crate::application::services::lifecycle::Lifecycle;
use crate::domain::{LogRecord, TraceMode, Verbosity};
use crate::error::ScaffoldResult;

/// Port for the log destination (the error stream in production).
///
/// Implemented by:
/// - `scriptkit_adapters::sink::StderrSink` (production)
/// - `scriptkit_adapters::sink::MemorySink` (testing)
pub trait LogSink: Send + Sync {
    /// Write one record. `color` asks for the severity label to be painted;
    /// the sink may still refuse when it is not a terminal.
    fn write_record(&self, record: &LogRecord, color: bool) -> Result<(), ApplicationError>;

    /// Write preformatted text (help output) as-is.
    fn write_raw(&self, text: &str) -> Result<(), ApplicationError>;

    /// Whether the destination can render ANSI colors at all.
    fn supports_color(&self) -> bool;
}

/// Port for wall-clock time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Port for ending the process.
pub trait ProcessExit: Send + Sync {
    fn exit(&self, code: u8) -> !;
}

/// Port for the execution trace layer (`-v` / `-d`).
pub trait ExecutionTracer: Send + Sync {
    /// Install tracing for `mode`. Called at most once per process.
    fn enable(&self, mode: TraceMode, color: bool) -> ScaffoldResult<()>;
}

/// Environment overrides read at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeSettings {
    pub log_level: Verbosity,
    pub no_color: bool,
}

/// Port for reading `LOG_LEVEL` / `NO_COLOR`.
///
/// An unparsable level is a configuration error.
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> ScaffoldResult<RuntimeSettings>;
}

/// Port for the interrupt (Ctrl-C) handler.
///
/// On interrupt the handler must call `lifecycle.terminate(130)`.
pub trait InterruptSource: Send + Sync {
    fn install(&self, lifecycle: Lifecycle) -> ScaffoldResult<()>;
}

/// Port for reading script sources from disk (used by the inspection tool).
pub trait ScriptReader: Send + Sync {
    fn read(&self, path: &Path) -> ScaffoldResult<String>;
}
