//! Interrupt (Ctrl-C) adapter.

use tracing::debug;

use scriptkit_core::{
    application::{ApplicationError, Lifecycle, ports::InterruptSource},
    error::{ScaffoldResult, exit_status},
};

/// Routes SIGINT / Ctrl-C through the exit phase, then exits with 130.
///
/// The `ctrlc` handler can be registered once per process.
#[derive(Debug, Clone, Copy, Default)]
pub struct CtrlcInterrupts;

impl InterruptSource for CtrlcInterrupts {
    fn install(&self, lifecycle: Lifecycle) -> ScaffoldResult<()> {
        ctrlc::set_handler(move || lifecycle.terminate(exit_status::INTERRUPTED)).map_err(|e| {
            ApplicationError::SignalHandler {
                reason: e.to_string(),
            }
        })?;
        debug!("interrupt handler installed");
        Ok(())
    }
}
