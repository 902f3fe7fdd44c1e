//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "boot a script" or "inspect a usage block".

pub mod lifecycle;
pub mod logger;
pub mod scaffold_service;
pub mod usage_service;

pub use lifecycle::{BodyError, ExitHook, Failure, FailureSite, Lifecycle, OrFail, PanicCapture};
pub use logger::Logger;
pub use scaffold_service::{CLEANUP_HOOK, Halt, Invocation, ScaffoldService};
pub use usage_service::{UsageService, program_name};
