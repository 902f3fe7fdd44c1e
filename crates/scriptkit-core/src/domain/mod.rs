// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for scriptkit.
//!
//! Pure logic: the option table, the usage-block extractor, the argument
//! parser and the log record model.
//!
//! - **No I/O**: no filesystem, terminal, clock or environment access
//! - **Synchronous**: every function is a plain transformation
//! - **Value types**: every entity is `Clone + PartialEq`
//!
// Public API - what the world sees
pub mod argv;
pub mod entities;
pub mod error;
pub mod usage_parser;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use argv::{ParsedArgs, UsageFailure, parse};
pub use entities::{
    LogRecord, Message, OptionSet, OptionSpec, OptionValue, OptionValues, ReservedFlag,
    ReservedFlags, TIMESTAMP_FORMAT, UsageDoc,
};
pub use error::{DomainError, ErrorCategory};
pub use usage_parser::{BlockLine, DocBlocks, extract_usage, locate_blocks, parse_usage_block};
pub use value_objects::{Severity, TraceMode, Verbosity};

pub use validation::DomainValidator;
