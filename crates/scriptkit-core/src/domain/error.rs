// ============================================================================
// domain/error.rs - USAGE AND CONFIGURATION ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel inside `UsageFailure` and help output)
/// - Categorizable (usage vs configuration, for exit codes)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ========================================================================
    // Usage block errors (script author mistakes)
    // ========================================================================
    #[error("no @usage block found in script source")]
    MissingUsageBlock,

    #[error("{marker} block opened on line {line} is never closed with @end")]
    UnterminatedBlock { marker: &'static str, line: usize },

    #[error("second {marker} block on line {line}; only one is allowed")]
    DuplicateBlock { marker: &'static str, line: usize },

    #[error("@usage block is empty")]
    EmptyUsageBlock,

    #[error("malformed option on line {line} ('{text}'): {reason}")]
    MalformedOption {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("flag {flag} is declared more than once")]
    DuplicateFlag { flag: String },

    #[error("flag {flag} is reserved by the scaffold and cannot be redeclared")]
    ReservedFlag { flag: String },

    #[error("option {flag} has contradictory markers: {reason}")]
    ConflictingMarkers { flag: String, reason: String },

    #[error("option declares neither a short nor a long form")]
    NamelessOption,

    // ========================================================================
    // Invocation errors (caller mistakes)
    // ========================================================================
    #[error("unknown option '{flag}'")]
    UnknownFlag { flag: String },

    #[error("option '{flag}' requires a value")]
    MissingValue { flag: String },

    #[error("option '{flag}' does not take a value")]
    UnexpectedValue { flag: String },

    #[error("required option {flag} was not provided")]
    MissingRequired { flag: String },

    // ========================================================================
    // Environment values
    // ========================================================================
    #[error("invalid log level '{0}': expected an integer from 0 to 7")]
    InvalidVerbosity(String),

    #[error("invalid severity '{0}'")]
    InvalidSeverity(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingUsageBlock => vec![
                "Add a block delimited by '@usage' and '@end' lines to the script source".into(),
                "Each option line looks like: -f --file [arg] Filename to process. Required."
                    .into(),
            ],
            Self::UnterminatedBlock { marker, .. } => {
                vec![format!("Close the {marker} block with a line containing only '@end'")]
            }
            Self::MalformedOption { .. } => vec![
                "Option lines start with '-x', '--long' or both, then an optional [placeholder]"
                    .into(),
            ],
            Self::ReservedFlag { .. } => vec![
                "-d/--debug, -v, -h/--help and -n/--no-color are provided by the scaffold".into(),
                "Remove the declaration or pick another flag".into(),
            ],
            Self::UnknownFlag { .. } | Self::MissingValue { .. } | Self::UnexpectedValue { .. } => {
                vec!["Run with --help to list the accepted options".into()]
            }
            Self::MissingRequired { flag } => vec![format!("Pass {flag} <value>")],
            Self::InvalidVerbosity(_) => vec![
                "LOG_LEVEL ranges from 0 (emergency only) to 7 (debug)".into(),
                "Unset LOG_LEVEL to use the default of 6 (info)".into(),
            ],
            _ => vec!["Check the @usage block of the script".into()],
        }
    }

    /// Error category for exit codes and display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownFlag { .. }
            | Self::MissingValue { .. }
            | Self::UnexpectedValue { .. }
            | Self::MissingRequired { .. } => ErrorCategory::Usage,
            _ => ErrorCategory::Configuration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Configuration,
}
