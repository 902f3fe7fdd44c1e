//! Domain value objects: Severity, Verbosity, TraceMode.
//!
//! # Design
//!
//! These are pure `Copy` value types with no identity.
//! This file's only job is to define the types, their string
//! representations, and their `FromStr` parsers.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Severity ─────────────────────────────────────────────────────────────────

/// Syslog-ordered log severity.
///
/// The discriminant is the syslog priority: 0 is the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 8] = [
        Self::Emergency,
        Self::Alert,
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(usize::from(rank)).copied()
    }

    /// Bracketed, right-aligned label used in log lines: `[     info]`.
    pub fn label(self) -> String {
        format!("[{:>9}]", self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "emergency" | "emerg" => Ok(Self::Emergency),
            "alert" => Ok(Self::Alert),
            "critical" | "crit" => Ok(Self::Critical),
            "error" | "err" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "notice" => Ok(Self::Notice),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(DomainError::InvalidSeverity(other.to_string())),
        }
    }
}

// ── Verbosity ────────────────────────────────────────────────────────────────

/// Active logging threshold, an integer in `0..=7`.
///
/// A record of severity `s` is written iff `s.rank() <= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Verbosity(u8);

impl Verbosity {
    pub const MIN: Verbosity = Verbosity(0);
    pub const MAX: Verbosity = Verbosity(7);

    pub fn new(level: u8) -> Result<Self, DomainError> {
        if level <= Self::MAX.0 {
            Ok(Self(level))
        } else {
            Err(DomainError::InvalidVerbosity(level.to_string()))
        }
    }

    /// Clamp an arbitrary level into range.
    pub fn saturating(level: u8) -> Self {
        Self(level.min(Self::MAX.0))
    }

    pub const fn level(self) -> u8 {
        self.0
    }

    pub fn permits(self, severity: Severity) -> bool {
        severity == Severity::Emergency || severity.rank() <= self.0
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self(Severity::Info.rank())
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Verbosity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let level: u8 = trimmed
            .parse()
            .map_err(|_| DomainError::InvalidVerbosity(trimmed.to_string()))?;
        Self::new(level)
    }
}

impl TryFrom<u8> for Verbosity {
    type Error = DomainError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Verbosity> for u8 {
    fn from(v: Verbosity) -> Self {
        v.0
    }
}

// ── TraceMode ────────────────────────────────────────────────────────────────

/// Execution tracing requested through the reserved `-v` / `-d` flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    #[default]
    Off,
    /// Echo each instrumented step as it starts.
    Verbose,
    /// Echo every span entry and exit with source locations.
    Full,
}

impl TraceMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Verbose => "verbose",
            Self::Full => "full",
        }
    }

    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
