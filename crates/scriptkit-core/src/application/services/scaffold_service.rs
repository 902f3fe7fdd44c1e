//! Scaffold Service - the boot pipeline of a generated script.
//!
//! This service coordinates the whole invocation:
//! 1. Create the lifecycle and logger, register the cleanup hook
//! 2. Apply `LOG_LEVEL` / `NO_COLOR`
//! 3. Extract the usage block from the script source
//! 4. Parse argv against it (help and usage errors end here with status 2)
//! 5. Apply the reserved flags (`-n`, `-d`, `-v`)
//! 6. Run the script body, mapping its outcome to an exit status
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ports::{Clock, ExecutionTracer, InterruptSource, LogSink, ProcessExit, SettingsSource},
        services::{
            lifecycle::{Failure, Lifecycle},
            logger::Logger,
        },
    },
    domain::{
        OptionValues, ParsedArgs, ReservedFlags, Severity, TraceMode, UsageDoc, UsageFailure,
        Verbosity, extract_usage, parse,
    },
    error::exit_status,
};

/// Name of the hook the scaffold registers before anything else.
pub const CLEANUP_HOOK: &str = "scaffold-cleanup";

/// Main scaffold service.
///
/// Holds the adapters; each `boot` creates a fresh lifecycle and logger.
pub struct ScaffoldService {
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    exit: Arc<dyn ProcessExit>,
    settings: Box<dyn SettingsSource>,
    tracer: Option<Box<dyn ExecutionTracer>>,
    interrupts: Option<Box<dyn InterruptSource>>,
}

/// Boot ended before the script body: help, usage or configuration error.
///
/// Whatever had to be written has been written; `exit` runs the exit phase
/// and ends the process.
#[derive(Debug)]
pub struct Halt {
    status: u8,
    lifecycle: Lifecycle,
}

impl Halt {
    fn new(status: u8, lifecycle: Lifecycle) -> Self {
        Self { status, lifecycle }
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn exit(self) -> ! {
        self.lifecycle.terminate(self.status)
    }
}

impl ScaffoldService {
    /// Create a new scaffold service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use scriptkit_core::application::ScaffoldService;
    ///
    /// let service = ScaffoldService::new(
    ///     Arc::new(sink),     // impl LogSink
    ///     Arc::new(clock),    // impl Clock
    ///     Arc::new(exit),     // impl ProcessExit
    ///     Box::new(settings), // impl SettingsSource
    /// );
    /// ```
    pub fn new(
        sink: Arc<dyn LogSink>,
        clock: Arc<dyn Clock>,
        exit: Arc<dyn ProcessExit>,
        settings: Box<dyn SettingsSource>,
    ) -> Self {
        Self {
            sink,
            clock,
            exit,
            settings,
            tracer: None,
            interrupts: None,
        }
    }

    /// Install execution tracing for `-v` / `-d` through `tracer`.
    pub fn with_tracer(mut self, tracer: Box<dyn ExecutionTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Route Ctrl-C through the exit phase.
    pub fn with_interrupts(mut self, interrupts: Box<dyn InterruptSource>) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    /// Boot, or end the process if the script body must not run.
    pub fn boot<S: AsRef<str>>(&self, program: &str, source: &str, argv: &[S]) -> Invocation {
        match self.try_boot(program, source, argv) {
            Ok(invocation) => invocation,
            Err(halt) => halt.exit(),
        }
    }

    /// Boot without exiting. `Err` carries the status the process should
    /// end with; help or diagnostics have already been written.
    #[instrument(skip_all, fields(program = %program, args = argv.len()))]
    pub fn try_boot<S: AsRef<str>>(
        &self,
        program: &str,
        source: &str,
        argv: &[S],
    ) -> Result<Invocation, Halt> {
        // 1. Lifecycle first, so every later exit runs the cleanup hook
        let lifecycle = Lifecycle::new(Arc::clone(&self.exit));
        let logger = Logger::new(
            Arc::clone(&self.sink),
            Arc::clone(&self.clock),
            lifecycle.clone(),
        );
        let cleanup = logger.clone();
        lifecycle.on_exit(CLEANUP_HOOK, move || cleanup.info("Cleaning up. Done"));

        if let Some(interrupts) = &self.interrupts {
            if let Err(e) = interrupts.install(lifecycle.clone()) {
                warn!(error = %e, "interrupt handler not installed");
            }
        }

        // 2. Environment overrides
        match self.settings.load() {
            Ok(settings) => logger.apply_settings(settings),
            Err(e) => return Err(configuration_halt(&logger, &lifecycle, e.to_string())),
        }

        // 3. Usage block
        let doc = match extract_usage(source) {
            Ok(doc) => doc,
            Err(e) => {
                return Err(configuration_halt(
                    &logger,
                    &lifecycle,
                    format!("Invalid usage block: {e}"),
                ));
            }
        };
        debug!(options = doc.options.len(), "usage block extracted");

        // 4. Arguments
        let args = match parse(argv, &doc.options) {
            Ok(args) => args,
            Err(UsageFailure { error, reserved }) => {
                apply_presentation(&logger, reserved);
                logger.write_raw(&doc.render_help(program, Some(&error.to_string())));
                return Err(Halt::new(exit_status::USAGE, lifecycle));
            }
        };

        if args.reserved.help {
            apply_presentation(&logger, args.reserved);
            logger.write_raw(&doc.render_help(program, None));
            return Err(Halt::new(exit_status::USAGE, lifecycle));
        }

        // 5. Reserved flags
        self.apply_reserved(&logger, &lifecycle, args.reserved);
        info!(
            options = args.options.len(),
            positionals = args.positionals.len(),
            "Arguments parsed"
        );

        Ok(Invocation {
            program: program.to_string(),
            doc,
            args,
            logger,
            lifecycle,
        })
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn apply_reserved(&self, logger: &Logger, lifecycle: &Lifecycle, reserved: ReservedFlags) {
        apply_presentation(logger, reserved);

        let mode = if reserved.debug {
            lifecycle.arm_error_phase();
            TraceMode::Full
        } else if reserved.verbose {
            TraceMode::Verbose
        } else {
            TraceMode::Off
        };

        if !mode.is_enabled() {
            return;
        }
        match &self.tracer {
            Some(tracer) => {
                if let Err(e) = tracer.enable(mode, logger.color_enabled()) {
                    logger.warning(format!("Execution tracing unavailable: {e}"));
                }
            }
            None => debug!(mode = %mode, "no execution tracer configured"),
        }
    }
}

/// `-n` and `-d` also shape help output, so they apply even on usage errors.
fn apply_presentation(logger: &Logger, reserved: ReservedFlags) {
    if reserved.no_color {
        logger.disable_color();
    }
    if reserved.debug {
        logger.set_threshold(Verbosity::MAX);
    }
}

fn configuration_halt(logger: &Logger, lifecycle: &Lifecycle, message: String) -> Halt {
    logger.log(Severity::Emergency, message);
    Halt::new(exit_status::CONFIGURATION, lifecycle.clone())
}

/// A booted script: parsed arguments plus the process logger and lifecycle.
#[derive(Debug)]
pub struct Invocation {
    program: String,
    doc: UsageDoc,
    args: ParsedArgs,
    logger: Logger,
    lifecycle: Lifecycle,
}

impl Invocation {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn usage(&self) -> &UsageDoc {
        &self.doc
    }

    pub fn args(&self) -> &ParsedArgs {
        &self.args
    }

    pub fn options(&self) -> &OptionValues {
        &self.args.options
    }

    pub fn positionals(&self) -> &[String] {
        &self.args.positionals
    }

    pub fn reserved(&self) -> ReservedFlags {
        self.args.reserved
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Append an exit hook (runs before the scaffold's own cleanup).
    pub fn on_exit(&self, name: impl Into<String>, hook: impl FnOnce() + Send + 'static) {
        self.lifecycle.on_exit(name, hook);
    }

    /// Print help (with an optional reason) and exit with status 2.
    pub fn help(&self, reason: Option<&str>) -> ! {
        self.logger
            .write_raw(&self.doc.render_help(&self.program, reason));
        self.lifecycle.terminate(exit_status::USAGE)
    }

    /// Run `body`, report how it ended, fire the exit phase and return the
    /// exit status.
    ///
    /// | Outcome                  | Status            |
    /// |--------------------------|-------------------|
    /// | `Ok(())`                 | 0                 |
    /// | `Err(Failure)`           | `Failure::status` |
    /// | panic                    | 101               |
    /// | terminated meanwhile     | that status       |
    pub fn execute<F>(&self, body: F) -> u8
    where
        F: FnOnce(&Invocation) -> Result<(), Failure>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(self)));

        let status = match outcome {
            Ok(Ok(())) => exit_status::SUCCESS,
            Ok(Err(failure)) => self.report_failure(&failure),
            Err(payload) => self.report_panic(payload.as_ref()),
        };

        // Blocks while an interrupt handler is still running hooks.
        self.lifecycle.fire_exit();
        self.lifecycle.termination_status().unwrap_or(status)
    }

    /// [`execute`](Self::execute) for `main`.
    pub fn run<F>(self, body: F) -> ExitCode
    where
        F: FnOnce(&Invocation) -> Result<(), Failure>,
    {
        ExitCode::from(self.execute(body))
    }

    fn report_failure(&self, failure: &Failure) -> u8 {
        self.logger.error(failure.report());
        self.lifecycle.run_error_phase(
            &self.logger,
            failure.site(),
            &failure.backtrace().to_string(),
        );
        failure.status()
    }

    fn report_panic(&self, payload: &(dyn Any + Send)) -> u8 {
        self.logger
            .error(format!("Script panicked: {}", panic_message(payload)));

        if let Some(capture) = self.lifecycle.take_panic() {
            self.lifecycle
                .run_error_phase(&self.logger, &capture.site, &capture.backtrace);
        }
        exit_status::PANIC
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::ports::{MockClock, RuntimeSettings};
    use crate::domain::{DomainError, LogRecord};
    use crate::error::{ScaffoldError, ScaffoldResult};
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SCRIPT: &str = r#"
//! @usage
//! Process CSV files into a report.
//! -f --file [arg]  Filename to process. Required.
//! -t --temp [arg]  Location of tempfile. Default="/tmp/bar"
//! -i --input [arg] Input files. Can be repeated.
//! -x               Increase intensity. Can be repeated.
//! -1 --one         Do just one thing.
//! @end
fn main() {}
"#;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn text(&self) -> String {
            self.lines.lock().unwrap().join("\n")
        }
    }

    impl LogSink for RecordingSink {
        fn write_record(&self, record: &LogRecord, _color: bool) -> Result<(), ApplicationError> {
            self.lines.lock().unwrap().extend(record.render_plain());
            Ok(())
        }

        fn write_raw(&self, text: &str) -> Result<(), ApplicationError> {
            self.lines.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn supports_color(&self) -> bool {
            false
        }
    }

    struct NoExit;

    impl ProcessExit for NoExit {
        fn exit(&self, code: u8) -> ! {
            panic!("unexpected exit({code})")
        }
    }

    struct FixedSettings(ScaffoldResult<RuntimeSettings>);

    impl SettingsSource for FixedSettings {
        fn load(&self) -> ScaffoldResult<RuntimeSettings> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct CountingTracer {
        calls: Mutex<Vec<TraceMode>>,
    }

    impl ExecutionTracer for Arc<CountingTracer> {
        fn enable(&self, mode: TraceMode, _color: bool) -> ScaffoldResult<()> {
            self.calls.lock().unwrap().push(mode);
            Ok(())
        }
    }

    fn clock() -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap());
        clock
    }

    fn service_with(sink: Arc<RecordingSink>, settings: RuntimeSettings) -> ScaffoldService {
        ScaffoldService::new(
            sink,
            Arc::new(clock()),
            Arc::new(NoExit),
            Box::new(FixedSettings(Ok(settings))),
        )
    }

    fn service(sink: Arc<RecordingSink>) -> ScaffoldService {
        service_with(sink, RuntimeSettings::default())
    }

    #[test]
    fn boot_parses_scenario_arguments() {
        let sink = Arc::new(RecordingSink::default());
        let inv = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["-x", "-x", "-x", "-f", "a.txt"])
            .unwrap();

        assert_eq!(inv.options().scalar("file"), Some("a.txt"));
        assert_eq!(inv.options().count("x"), 3);
        assert_eq!(inv.options().scalar("temp"), Some("/tmp/bar"));
        assert_eq!(inv.lifecycle().pending_hooks(), 1);
    }

    #[test]
    fn help_halts_with_status_two() {
        let sink = Arc::new(RecordingSink::default());
        let halt = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["--help"])
            .unwrap_err();

        assert_eq!(halt.status(), exit_status::USAGE);
        let text = sink.text();
        assert!(text.contains("Usage: demo [OPTIONS]"));
        assert!(text.contains("Process CSV files into a report."));
        assert!(text.contains("-f, --file [arg]"));
    }

    #[test]
    fn missing_required_shows_reason_and_never_runs_body() {
        let sink = Arc::new(RecordingSink::default());
        let halt = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["-x"])
            .unwrap_err();

        assert_eq!(halt.status(), exit_status::USAGE);
        assert!(sink.text().contains("required option -f (--file) was not provided"));

        halt.lifecycle().fire_exit();
        assert!(sink.text().ends_with("[     info] Cleaning up. Done"));
    }

    #[test]
    fn broken_usage_block_is_a_configuration_error() {
        let sink = Arc::new(RecordingSink::default());
        let source = "// @usage\n// -h --hold  Hold on.\n// @end\n";
        let halt = service(Arc::clone(&sink))
            .try_boot("demo", source, &[] as &[&str])
            .unwrap_err();

        assert_eq!(halt.status(), exit_status::CONFIGURATION);
        assert!(sink.text().contains("[emergency] Invalid usage block"));
    }

    #[test]
    fn invalid_log_level_is_a_configuration_error() {
        let sink = Arc::new(RecordingSink::default());
        let service = ScaffoldService::new(
            Arc::clone(&sink) as Arc<dyn LogSink>,
            Arc::new(clock()),
            Arc::new(NoExit),
            Box::new(FixedSettings(Err(ScaffoldError::Domain(
                DomainError::InvalidVerbosity("9".into()),
            )))),
        );

        let halt = service.try_boot("demo", SCRIPT, &["-f", "a"]).unwrap_err();
        assert_eq!(halt.status(), exit_status::CONFIGURATION);
        assert!(sink.text().contains("invalid log level '9'"));
    }

    #[test]
    fn log_level_zero_silences_cleanup() {
        let sink = Arc::new(RecordingSink::default());
        let settings = RuntimeSettings {
            log_level: Verbosity::MIN,
            no_color: false,
        };
        let inv = service_with(Arc::clone(&sink), settings)
            .try_boot("demo", SCRIPT, &["-f", "a"])
            .unwrap();

        assert_eq!(inv.execute(|_| Ok(())), exit_status::SUCCESS);
        assert_eq!(sink.text(), "");
    }

    #[test]
    fn debug_flag_raises_threshold_and_enables_full_trace() {
        let sink = Arc::new(RecordingSink::default());
        let tracer = Arc::new(CountingTracer::default());
        let inv = service(Arc::clone(&sink))
            .with_tracer(Box::new(Arc::clone(&tracer)))
            .try_boot("demo", SCRIPT, &["-d", "-f", "a"])
            .unwrap();

        assert_eq!(inv.logger().threshold(), Verbosity::MAX);
        assert!(inv.lifecycle().error_phase_armed());
        assert_eq!(*tracer.calls.lock().unwrap(), [TraceMode::Full]);
    }

    #[test]
    fn verbose_flag_enables_step_trace_only() {
        let sink = Arc::new(RecordingSink::default());
        let tracer = Arc::new(CountingTracer::default());
        let inv = service(Arc::clone(&sink))
            .with_tracer(Box::new(Arc::clone(&tracer)))
            .try_boot("demo", SCRIPT, &["-v", "-f", "a"])
            .unwrap();

        assert_eq!(inv.logger().threshold(), Verbosity::default());
        assert!(!inv.lifecycle().error_phase_armed());
        assert_eq!(*tracer.calls.lock().unwrap(), [TraceMode::Verbose]);
    }

    #[test]
    fn body_success_runs_hooks_once_in_reverse() {
        let sink = Arc::new(RecordingSink::default());
        let inv = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["-f", "a"])
            .unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let hook_logger = inv.logger().clone();
        inv.on_exit("script", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            hook_logger.info("script hook");
        });

        assert_eq!(inv.execute(|_| Ok(())), exit_status::SUCCESS);
        inv.lifecycle().fire_exit();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        let text = sink.text();
        let script = text.find("script hook").unwrap();
        let cleanup = text.find("Cleaning up. Done").unwrap();
        assert!(script < cleanup);
    }

    #[test]
    fn failure_status_is_propagated() {
        let sink = Arc::new(RecordingSink::default());
        let inv = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["-f", "a"])
            .unwrap();

        let status = inv.execute(|_| Err(Failure::with_status("quota exceeded", 3)));

        assert_eq!(status, 3);
        assert!(sink.text().contains("[    error] quota exceeded"));
        assert!(!sink.text().contains("Error in"));
    }

    #[test]
    fn propagated_error_reports_the_question_mark_site() {
        let sink = Arc::new(RecordingSink::default());
        let inv = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["-d", "-f", "a"])
            .unwrap();

        let line = line!() + 2;
        let status = inv.execute(|_| {
            std::fs::read_to_string("/definitely/not/here")?;
            Ok(())
        });

        assert_eq!(status, exit_status::FAILURE);
        let text = sink.text();
        assert!(text.contains("[    error] "));
        assert!(
            text.contains(&format!("scaffold_service.rs in function main on line {line}")),
            "{text}"
        );
        assert!(text.contains("[    debug] Backtrace:"));
    }

    #[test]
    fn error_log_includes_underlying_causes() {
        #[derive(Debug)]
        struct Reading(std::io::Error);

        impl std::fmt::Display for Reading {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("reading input.csv")
            }
        }

        impl std::error::Error for Reading {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let sink = Arc::new(RecordingSink::default());
        let inv = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["-f", "a"])
            .unwrap();

        let status = inv.execute(|_| Err(Reading(std::io::Error::other("no such file")).into()));

        assert_eq!(status, exit_status::FAILURE);
        assert!(sink.text().contains("[    error] reading input.csv: no such file"));
    }

    struct RecordingExit(Mutex<Vec<u8>>);

    impl ProcessExit for Arc<RecordingExit> {
        fn exit(&self, code: u8) -> ! {
            self.0.lock().unwrap().push(code);
            panic!("exit({code})")
        }
    }

    #[test]
    fn status_of_a_concurrent_termination_wins() {
        let sink = Arc::new(RecordingSink::default());
        let exits = Arc::new(RecordingExit(Mutex::new(Vec::new())));
        let inv = ScaffoldService::new(
            Arc::clone(&sink) as Arc<dyn LogSink>,
            Arc::new(clock()),
            Arc::new(Arc::clone(&exits)),
            Box::new(FixedSettings(Ok(RuntimeSettings::default()))),
        )
        .try_boot("demo", SCRIPT, &["-f", "a"])
        .unwrap();

        let status = inv.execute(|inv| {
            let lifecycle = inv.lifecycle().clone();
            let handler = std::thread::spawn(move || lifecycle.terminate(exit_status::INTERRUPTED));
            assert!(handler.join().is_err());
            Ok(())
        });

        assert_eq!(status, exit_status::INTERRUPTED);
        assert_eq!(*exits.0.lock().unwrap(), [exit_status::INTERRUPTED]);
        assert_eq!(sink.text().matches("Cleaning up. Done").count(), 1);
    }

    #[test]
    fn panic_exits_101_and_still_cleans_up() {
        let sink = Arc::new(RecordingSink::default());
        let inv = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["-f", "a"])
            .unwrap();

        let status = inv.execute(|_| panic!("boom"));

        assert_eq!(status, exit_status::PANIC);
        let text = sink.text();
        assert!(text.contains("Script panicked: boom"));
        assert!(text.contains("Cleaning up. Done"));
    }

    #[test]
    fn no_color_flag_applies_to_usage_errors() {
        let sink = Arc::new(RecordingSink::default());
        let halt = service(Arc::clone(&sink))
            .try_boot("demo", SCRIPT, &["-n", "--bogus"])
            .unwrap_err();
        assert_eq!(halt.status(), exit_status::USAGE);
        assert!(sink.text().contains("unknown option '--bogus'"));
    }
}
