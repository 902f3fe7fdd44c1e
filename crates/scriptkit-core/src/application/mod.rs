//! Application layer for scriptkit.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ScaffoldService, UsageService,
//!   plus the Logger and Lifecycle they hand to script bodies)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! parsing rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    BodyError, Failure, FailureSite, Halt, Invocation, Lifecycle, Logger, OrFail, ScaffoldService,
    UsageService, program_name,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    Clock, ExecutionTracer, InterruptSource, LogSink, ProcessExit, RuntimeSettings, ScriptReader,
    SettingsSource,
};

pub use error::ApplicationError;
