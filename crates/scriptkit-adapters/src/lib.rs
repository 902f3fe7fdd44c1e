//! Infrastructure adapters for scriptkit.
//!
//! This crate implements the ports defined in `scriptkit-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod clock;
pub mod process;
pub mod settings;
pub mod signals;
pub mod sink;
pub mod source;
pub mod trace;

use std::sync::Arc;

use scriptkit_core::application::{ScaffoldService, UsageService};

// Re-export commonly used adapters
pub use clock::{FixedClock, SystemClock};
pub use process::StdExit;
pub use settings::EnvSettings;
pub use signals::CtrlcInterrupts;
pub use sink::{MemorySink, StderrSink};
pub use source::FsScriptReader;
pub use trace::SubscriberTracer;

/// The scaffold wired for a real process: stderr, wall clock, process
/// environment, `tracing-subscriber` and Ctrl-C handling.
pub fn scaffold_service() -> ScaffoldService {
    ScaffoldService::new(
        Arc::new(StderrSink::new()),
        Arc::new(SystemClock),
        Arc::new(StdExit),
        Box::new(EnvSettings::from_process()),
    )
    .with_tracer(Box::new(SubscriberTracer))
    .with_interrupts(Box::new(CtrlcInterrupts))
}

/// Usage inspection over the local filesystem.
pub fn usage_service() -> UsageService {
    UsageService::new(Box::new(FsScriptReader))
}
