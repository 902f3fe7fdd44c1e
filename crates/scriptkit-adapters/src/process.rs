//! Process exit adapter.

use scriptkit_core::application::ports::ProcessExit;

/// Ends the process with `std::process::exit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdExit;

impl ProcessExit for StdExit {
    fn exit(&self, code: u8) -> ! {
        std::process::exit(i32::from(code))
    }
}
