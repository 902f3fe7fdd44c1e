//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `scriptkit-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `LogSink`: where log records and help text go
//!   - `Clock`: timestamps for records
//!   - `ProcessExit`: terminating the process
//!   - `ExecutionTracer`: the `-v` / `-d` trace layer
//!   - `SettingsSource`: environment overrides
//!   - `InterruptSource`: Ctrl-C handling
//!   - `ScriptReader`: loading script sources for inspection
//!
//! - **Driving (Input) Ports**: `ScaffoldService::boot` / `run`, called by
//!   generated scripts

pub mod output;

pub use output::{
    Clock, ExecutionTracer, InterruptSource, LogSink, ProcessExit, RuntimeSettings, ScriptReader,
    SettingsSource,
};

#[cfg(test)]
pub use output::MockClock;
