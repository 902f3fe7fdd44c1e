//! scriptkit Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers of the scriptkit
//! script scaffold: leveled logging, usage-block driven argument parsing,
//! and exit/error lifecycle hooks.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   generated script / scriptkit-cli      │
//! │     (Drives ScaffoldService)            │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ScaffoldService, UsageService,        │
//! │   Logger, Lifecycle)                    │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (LogSink, Clock, ProcessExit, Tracer)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   scriptkit-adapters (Infrastructure)   │
//! │  (StderrSink, SystemClock, EnvSettings) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (OptionSet, UsageDoc, argv parser)     │
//! │         No I/O                          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scriptkit_core::prelude::*;
//!
//! const SOURCE: &str = include_str!("main.rs");
//!
//! fn main() -> std::process::ExitCode {
//!     let service = ScaffoldService::new(sink, clock, exit, settings);
//!     let argv: Vec<String> = std::env::args().skip(1).collect();
//!     let invocation = service.boot("report", SOURCE, &argv);
//!
//!     invocation.run(|inv| {
//!         let file = inv.options().scalar("file").or_fail("no input")?;
//!         inv.logger().info(Message::new("Processing").and(file));
//!         Ok(())
//!     })
//! }
//! ```

// Domain layer (stable, well-defined API)
pub mod domain;

// Application layer (orchestration logic)
pub mod application;

// Error types
pub mod error;

// Public API - what generated scripts should use
pub mod prelude {
    pub use crate::application::{
        BodyError, Failure, Invocation, Lifecycle, Logger, OrFail, ScaffoldService,
        UsageService,
        ports::{Clock, ExecutionTracer, LogSink, ProcessExit, SettingsSource},
    };
    pub use crate::domain::{
        Message, OptionSet, OptionSpec, OptionValue, OptionValues, ParsedArgs, Severity,
        TraceMode, UsageDoc, Verbosity,
    };
    pub use crate::error::{ScaffoldError, ScaffoldResult, exit_status};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
