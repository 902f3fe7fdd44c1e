//! Application layer errors.
//!
//! These errors represent failures in the process plumbing, not in the
//! usage block or the invocation. Those are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while running the scaffold.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The log destination rejected a write.
    #[error("failed to write to log sink: {reason}")]
    SinkWrite { reason: String },

    /// Shared scaffold state was poisoned by a panic.
    #[error("scaffold state lock poisoned: {name}")]
    LockPoisoned { name: &'static str },

    /// The execution trace layer could not be installed.
    #[error("failed to enable execution tracing: {reason}")]
    TracingInit { reason: String },

    /// The script source holding the usage block could not be read.
    #[error("cannot read script source {path}: {reason}")]
    SourceUnreadable { path: String, reason: String },

    /// The interrupt handler could not be registered.
    #[error("failed to install interrupt handler: {reason}")]
    SignalHandler { reason: String },

    /// An environment override could not be read.
    #[error("invalid environment setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SinkWrite { .. } => vec!["Check that stderr is open and writable".into()],
            Self::TracingInit { .. } => vec![
                "Another tracing subscriber may already be installed".into(),
                "Run without -v/-d to skip execution tracing".into(),
            ],
            Self::SourceUnreadable { path, .. } => vec![
                format!("Failed to access: {}", path),
                "Check that the file exists and is readable".into(),
            ],
            Self::InvalidSetting { key, .. } => vec![
                format!("Fix or unset {key}"),
                "LOG_LEVEL takes 0 (emergency only) to 7 (debug)".into(),
            ],
            Self::LockPoisoned { .. } | Self::SignalHandler { .. } => {
                vec!["Check the error details above".into()]
            }
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceUnreadable { .. } | Self::InvalidSetting { .. } => {
                ErrorCategory::Configuration
            }
            Self::SinkWrite { .. }
            | Self::LockPoisoned { .. }
            | Self::TracingInit { .. }
            | Self::SignalHandler { .. } => ErrorCategory::Internal,
        }
    }
}
