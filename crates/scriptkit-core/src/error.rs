//! Unified error handling for scriptkit core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with user-actionable suggestions and exit-status mapping.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Process exit statuses used by the scaffold.
///
/// | Code | Meaning                        |
/// |------|--------------------------------|
/// |  0   | Success                        |
/// |  1   | Script failure / emergency     |
/// |  2   | Usage error or explicit help   |
/// |  4   | Configuration error            |
/// | 101  | Panic in the script body       |
/// | 130  | Interrupted                    |
pub mod exit_status {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    pub const USAGE: u8 = 2;
    pub const CONFIGURATION: u8 = 4;
    pub const PANIC: u8 = 101;
    pub const INTERRUPTED: u8 = 130;
}

/// Root error type for scriptkit core operations.
#[derive(Debug, Error, Clone)]
pub enum ScaffoldError {
    /// Errors from the domain layer (usage blocks and invocations).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (sinks, tracing, sources).
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl ScaffoldError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Usage => ErrorCategory::Usage,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
            },
            Self::Application(e) => e.category(),
        }
    }

    /// Exit status for this error.
    pub fn exit_status(&self) -> u8 {
        match self.category() {
            ErrorCategory::Usage => exit_status::USAGE,
            ErrorCategory::Configuration => exit_status::CONFIGURATION,
            ErrorCategory::Internal => exit_status::FAILURE,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type ScaffoldResult<T> = Result<T, ScaffoldError>;
