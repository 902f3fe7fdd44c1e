//! Lifecycle Manager - exit hooks and the debug-mode error phase.
//!
//! The exit phase is an ordered list of hooks that runs exactly once, in
//! reverse registration order, on every way out of the process: normal
//! return, help, emergency, body failure and interrupt.
//!
//! The error phase is armed by `-d`. It logs where a body failure or panic
//! happened, then the captured backtrace. It never changes the exit status.

use std::backtrace::Backtrace;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock, PoisonError};

use tracing::{Span, debug, warn};

use crate::application::ports::ProcessExit;
use crate::application::services::logger::Logger;
use crate::domain::Message;
use crate::error::exit_status;

/// A registered exit-phase action.
pub type ExitHook = Box<dyn FnOnce() + Send + 'static>;

/// Any error a script body can propagate with `?`.
pub type BodyError = Box<dyn std::error::Error + Send + Sync + 'static>;

thread_local! {
    static IN_EXIT_PHASE: Cell<bool> = const { Cell::new(false) };
}

/// Where a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSite {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl FailureSite {
    /// Site at `location`, attributed to the innermost active span.
    pub fn at(location: &Location<'_>) -> Self {
        Self {
            function: current_function(),
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

impl fmt::Display for FailureSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error in {} in function {} on line {}",
            self.file, self.function, self.line
        )
    }
}

fn current_function() -> String {
    Span::current()
        .metadata()
        .map_or_else(|| "main".to_string(), |m| m.name().to_string())
}

/// Panic details recorded by the debug-mode panic hook.
#[derive(Debug, Clone)]
pub struct PanicCapture {
    pub site: FailureSite,
    pub backtrace: String,
}

struct NamedHook {
    name: String,
    hook: ExitHook,
}

struct LifecycleInner {
    hooks: Mutex<Vec<NamedHook>>,
    fired: AtomicBool,
    exit_phase: Once,
    termination: OnceLock<u8>,
    error_phase: AtomicBool,
    last_panic: Arc<Mutex<Option<PanicCapture>>>,
    exit: Arc<dyn ProcessExit>,
}

/// Process-scoped exit and error phases.
///
/// Cheap to clone; all clones share the same hook list.
#[derive(Clone)]
pub struct Lifecycle {
    inner: Arc<LifecycleInner>,
}

impl Lifecycle {
    pub fn new(exit: Arc<dyn ProcessExit>) -> Self {
        Self {
            inner: Arc::new(LifecycleInner {
                hooks: Mutex::new(Vec::new()),
                fired: AtomicBool::new(false),
                exit_phase: Once::new(),
                termination: OnceLock::new(),
                error_phase: AtomicBool::new(false),
                last_panic: Arc::new(Mutex::new(None)),
                exit,
            }),
        }
    }

    /// Append an exit hook. Hooks added after the exit phase fired never run.
    pub fn on_exit(&self, name: impl Into<String>, hook: impl FnOnce() + Send + 'static) {
        let name = name.into();
        if self.has_fired() {
            warn!(hook = %name, "exit phase already ran; hook ignored");
            return;
        }
        self.inner
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(NamedHook {
                name,
                hook: Box::new(hook),
            });
    }

    /// Number of hooks waiting for the exit phase.
    pub fn pending_hooks(&self) -> usize {
        self.inner
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn has_fired(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    /// Run the exit phase. Only the first call does anything; it returns the
    /// number of hooks that ran.
    ///
    /// Callers on other threads block until the running phase has finished.
    /// A hook that fires the phase again gets 0. A panicking hook is logged
    /// and skipped so later hooks still run.
    pub fn fire_exit(&self) -> usize {
        if IN_EXIT_PHASE.get() {
            return 0;
        }
        let mut count = 0;
        self.inner.exit_phase.call_once(|| {
            IN_EXIT_PHASE.set(true);
            count = self.run_hooks();
            IN_EXIT_PHASE.set(false);
        });
        count
    }

    fn run_hooks(&self) -> usize {
        self.inner.fired.store(true, Ordering::SeqCst);
        let hooks = std::mem::take(
            &mut *self
                .inner
                .hooks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let count = hooks.len();
        for NamedHook { name, hook } in hooks.into_iter().rev() {
            debug!(hook = %name, "running exit hook");
            if panic::catch_unwind(AssertUnwindSafe(hook)).is_err() {
                warn!(hook = %name, "exit hook panicked");
            }
        }
        count
    }

    /// Fire the exit phase, then end the process with `code`.
    ///
    /// The first code wins; see [`termination_status`](Self::termination_status).
    pub fn terminate(&self, code: u8) -> ! {
        let _ = self.inner.termination.set(code);
        self.fire_exit();
        self.inner.exit.exit(code)
    }

    /// Status passed to the first [`terminate`](Self::terminate), if any.
    ///
    /// A thread returning normally while another terminates (Ctrl-C) must
    /// exit with this status, not its own.
    pub fn termination_status(&self) -> Option<u8> {
        self.inner.termination.get().copied()
    }

    /// Arm the error phase and install a panic hook that records the panic
    /// site in place of the default panic message.
    pub fn arm_error_phase(&self) {
        if self.inner.error_phase.swap(true, Ordering::SeqCst) {
            return;
        }
        let slot = Arc::clone(&self.inner.last_panic);
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            let site = match info.location() {
                Some(location) => FailureSite::at(location),
                None => FailureSite {
                    function: current_function(),
                    file: "<unknown>".to_string(),
                    line: 0,
                },
            };
            let capture = PanicCapture {
                site,
                backtrace: Backtrace::force_capture().to_string(),
            };
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(capture);
        }));
        debug!("error phase armed");
    }

    pub fn error_phase_armed(&self) -> bool {
        self.inner.error_phase.load(Ordering::SeqCst)
    }

    /// Take the most recent panic recorded by the error-phase panic hook.
    pub fn take_panic(&self) -> Option<PanicCapture> {
        self.inner
            .last_panic
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Run the error phase when armed: the failure site at error severity,
    /// then the backtrace at debug severity.
    pub fn run_error_phase(&self, logger: &Logger, site: &FailureSite, backtrace: &str) {
        if !self.error_phase_armed() {
            return;
        }
        logger.error(site.to_string());
        let trace = backtrace.trim_end();
        if !trace.is_empty() {
            logger.debug(Message::new(format!("Backtrace:\n{trace}")));
        }
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("pending_hooks", &self.pending_hooks())
            .field("fired", &self.has_fired())
            .field("error_phase", &self.error_phase_armed())
            .finish()
    }
}

// ── Failures ─────────────────────────────────────────────────────────────────

/// A script-body failure carrying its exit status and origin.
///
/// Bodies passed to `Invocation::run` return `Result<(), Failure>`. Any
/// error converts with `?`, recording the site of the `?` itself.
#[derive(Debug)]
pub struct Failure {
    message: String,
    status: u8,
    site: FailureSite,
    backtrace: Backtrace,
    cause: Option<BodyError>,
}

impl Failure {
    /// Failure with the default status (1).
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_status(message, exit_status::FAILURE)
    }

    #[track_caller]
    pub fn with_status(message: impl Into<String>, status: u8) -> Self {
        Self {
            message: message.into(),
            status,
            site: FailureSite::at(Location::caller()),
            backtrace: Backtrace::force_capture(),
            cause: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn site(&self) -> &FailureSite {
        &self.site
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// The message followed by every underlying cause, joined by `": "`.
    pub fn report(&self) -> String {
        let mut text = self.message.clone();
        let mut next = self.cause.as_deref().and_then(|err| err.source());
        while let Some(cause) = next {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            next = cause.source();
        }
        text
    }
}

// `Failure` is not itself an `Error`, so this does not overlap `From<T> for T`.
impl<E> From<E> for Failure
where
    E: Into<BodyError>,
{
    #[track_caller]
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            message: err.to_string(),
            status: exit_status::FAILURE,
            site: FailureSite::at(Location::caller()),
            backtrace: Backtrace::force_capture(),
            cause: Some(err),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Turn any displayable error into a [`Failure`] at the call site.
pub trait OrFail<T> {
    fn or_fail(self, context: &str) -> Result<T, Failure>;
}

impl<T, E: fmt::Display> OrFail<T> for Result<T, E> {
    #[track_caller]
    fn or_fail(self, context: &str) -> Result<T, Failure> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(Failure::new(format!("{context}: {err}"))),
        }
    }
}

impl<T> OrFail<T> for Option<T> {
    #[track_caller]
    fn or_fail(self, context: &str) -> Result<T, Failure> {
        match self {
            Some(value) => Ok(value),
            None => Err(Failure::new(context)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct NoExit;

    impl ProcessExit for NoExit {
        fn exit(&self, code: u8) -> ! {
            panic!("unexpected exit({code})")
        }
    }

    fn lifecycle() -> Lifecycle {
        Lifecycle::new(Arc::new(NoExit))
    }

    #[test]
    fn hooks_run_in_reverse_registration_order() {
        let lc = lifecycle();
        let order = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            lc.on_exit(name, move || order.lock().unwrap().push(name));
        }

        assert_eq!(lc.fire_exit(), 3);
        assert_eq!(*order.lock().unwrap(), ["third", "second", "first"]);
    }

    #[test]
    fn exit_phase_runs_once() {
        let lc = lifecycle();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        lc.on_exit("count", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        lc.fire_exit();
        lc.clone().fire_exit();
        lc.fire_exit();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(lc.has_fired());
    }

    #[test]
    fn hooks_added_after_firing_are_ignored() {
        let lc = lifecycle();
        lc.fire_exit();
        lc.on_exit("late", || panic!("must not run"));
        assert_eq!(lc.pending_hooks(), 0);
        assert_eq!(lc.fire_exit(), 0);
    }

    #[test]
    fn panicking_hook_does_not_stop_the_rest() {
        let lc = lifecycle();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        lc.on_exit("survivor", move || flag.store(true, Ordering::SeqCst));
        lc.on_exit("broken", || panic!("hook failure"));

        assert_eq!(lc.fire_exit(), 2);
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn concurrent_fire_runs_hooks_once() {
        let lc = lifecycle();
        let runs = Arc::new(AtomicUsize::new(0));
        for i in 0..4 {
            let runs = Arc::clone(&runs);
            lc.on_exit(format!("hook-{i}"), move || {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lc = lc.clone();
                std::thread::spawn(move || lc.fire_exit())
            })
            .collect();
        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(total, 4);
        assert_eq!(runs.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn failure_records_call_site() {
        let line = line!() + 1;
        let failure = Failure::new("disk full");
        assert_eq!(failure.site().line, line);
        assert!(failure.site().file.ends_with("lifecycle.rs"));
        assert_eq!(failure.site().function, "main");
        assert_eq!(failure.status(), exit_status::FAILURE);
    }

    #[test]
    fn or_fail_wraps_error_with_context() {
        let res: Result<(), std::io::Error> = Err(std::io::Error::other("no space"));
        let failure = res.or_fail("writing report").unwrap_err();
        assert_eq!(failure.to_string(), "writing report: no space");
        assert_eq!(failure.status(), 1);
    }

    #[test]
    fn question_mark_records_its_own_line() {
        fn open() -> Result<(), Failure> {
            std::fs::read_to_string("/definitely/not/here")?;
            Ok(())
        }
        let line = line!() - 3;

        let failure = open().unwrap_err();
        assert_eq!(failure.site().line, line);
        assert!(failure.site().file.ends_with("lifecycle.rs"));
        assert_eq!(failure.status(), exit_status::FAILURE);
    }

    #[test]
    fn report_joins_the_cause_chain() {
        #[derive(Debug)]
        struct Outer(std::io::Error);

        impl fmt::Display for Outer {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("reading notes.txt")
            }
        }

        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let failure = Failure::from(Outer(std::io::Error::other("permission denied")));
        assert_eq!(failure.message(), "reading notes.txt");
        assert_eq!(failure.report(), "reading notes.txt: permission denied");
        assert_eq!(Failure::new("plain").report(), "plain");
    }

    #[test]
    fn string_errors_convert() {
        let failure: Failure = "quota exceeded".into();
        assert_eq!(failure.report(), "quota exceeded");
    }

    #[test]
    fn other_threads_wait_for_the_running_exit_phase() {
        let lc = lifecycle();
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        lc.on_exit("slow", move || {
            started_tx.send(()).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(200));
            flag.store(true, Ordering::SeqCst);
        });

        let firing = {
            let lc = lc.clone();
            std::thread::spawn(move || lc.fire_exit())
        };
        started_rx.recv().unwrap();

        assert_eq!(lc.fire_exit(), 0);
        assert!(finished.load(Ordering::SeqCst), "returned before the hook finished");
        assert_eq!(firing.join().unwrap(), 1);
    }

    #[test]
    fn hook_refiring_the_phase_does_not_deadlock() {
        let lc = lifecycle();
        let inner = lc.clone();
        let nested = Arc::new(AtomicUsize::new(usize::MAX));
        let seen = Arc::clone(&nested);
        lc.on_exit("reentrant", move || {
            seen.store(inner.fire_exit(), Ordering::SeqCst);
        });

        assert_eq!(lc.fire_exit(), 1);
        assert_eq!(nested.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn termination_status_is_recorded_before_exit() {
        let lc = lifecycle();
        assert_eq!(lc.termination_status(), None);

        let terminating = lc.clone();
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(move || {
            terminating.terminate(exit_status::INTERRUPTED)
        }));

        assert!(outcome.is_err());
        assert_eq!(lc.termination_status(), Some(exit_status::INTERRUPTED));
        assert!(lc.has_fired());
    }

    #[test]
    fn failure_site_message_format() {
        let site = FailureSite {
            function: "load_input".into(),
            file: "src/bin/demo.rs".into(),
            line: 42,
        };
        assert_eq!(
            site.to_string(),
            "Error in src/bin/demo.rs in function load_input on line 42"
        );
    }

    #[test]
    fn error_phase_disarmed_by_default() {
        assert!(!lifecycle().error_phase_armed());
    }
}
