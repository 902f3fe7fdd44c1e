//! Log sink adapters.

mod memory;
mod stderr;

pub use memory::MemorySink;
pub use stderr::{StderrSink, paint_label, severity_style};
