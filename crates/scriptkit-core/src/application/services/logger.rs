//! Severity-leveled logger.
//!
//! Eight entry points in syslog order. A record is written iff its rank is
//! within the active threshold; `emergency` always writes and then ends the
//! process through the lifecycle. Write failures never reach the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tracing::trace;

use crate::application::ports::{Clock, LogSink, RuntimeSettings};
use crate::application::services::lifecycle::Lifecycle;
use crate::domain::{LogRecord, Message, Severity, Verbosity};
use crate::error::exit_status;

struct LoggerInner {
    threshold: AtomicU8,
    color: AtomicBool,
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    lifecycle: Lifecycle,
}

/// Shared handle to the process logger.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>, clock: Arc<dyn Clock>, lifecycle: Lifecycle) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                threshold: AtomicU8::new(Verbosity::default().level()),
                color: AtomicBool::new(true),
                sink,
                clock,
                lifecycle,
            }),
        }
    }

    /// Apply `LOG_LEVEL` / `NO_COLOR`.
    pub fn apply_settings(&self, settings: RuntimeSettings) {
        self.set_threshold(settings.log_level);
        if settings.no_color {
            self.disable_color();
        }
    }

    pub fn threshold(&self) -> Verbosity {
        Verbosity::saturating(self.inner.threshold.load(Ordering::Relaxed))
    }

    pub fn set_threshold(&self, threshold: Verbosity) {
        self.inner
            .threshold
            .store(threshold.level(), Ordering::Relaxed);
    }

    pub fn disable_color(&self) {
        self.inner.color.store(false, Ordering::Relaxed);
    }

    /// Color is used only when not disabled and the sink can show it.
    pub fn color_enabled(&self) -> bool {
        self.inner.color.load(Ordering::Relaxed) && self.inner.sink.supports_color()
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        self.threshold().permits(severity)
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.inner.lifecycle
    }

    /// Write an emergency record, run the exit phase, exit with status 1.
    pub fn emergency(&self, message: impl Into<Message>) -> ! {
        self.fatal(message, exit_status::FAILURE)
    }

    /// Write an emergency record, run the exit phase, exit with `status`.
    pub fn fatal(&self, message: impl Into<Message>, status: u8) -> ! {
        self.write(Severity::Emergency, message.into());
        self.inner.lifecycle.terminate(status)
    }

    pub fn alert(&self, message: impl Into<Message>) {
        self.write(Severity::Alert, message.into());
    }

    pub fn critical(&self, message: impl Into<Message>) {
        self.write(Severity::Critical, message.into());
    }

    pub fn error(&self, message: impl Into<Message>) {
        self.write(Severity::Error, message.into());
    }

    pub fn warning(&self, message: impl Into<Message>) {
        self.write(Severity::Warning, message.into());
    }

    pub fn notice(&self, message: impl Into<Message>) {
        self.write(Severity::Notice, message.into());
    }

    pub fn info(&self, message: impl Into<Message>) {
        self.write(Severity::Info, message.into());
    }

    pub fn debug(&self, message: impl Into<Message>) {
        self.write(Severity::Debug, message.into());
    }

    /// Write `message` at `severity` without any exit side effect.
    ///
    /// Used for emergencies the caller terminates itself.
    pub fn log(&self, severity: Severity, message: impl Into<Message>) {
        self.write(severity, message.into());
    }

    /// Write preformatted text (help output) to the log destination.
    pub fn write_raw(&self, text: &str) {
        if let Err(err) = self.inner.sink.write_raw(text) {
            trace!(error = %err, "dropped raw output");
        }
    }

    fn write(&self, severity: Severity, message: Message) {
        if !self.enabled(severity) {
            return;
        }
        let record = LogRecord::new(self.inner.clock.now(), severity, &message);
        if let Err(err) = self.inner.sink.write_record(&record, self.color_enabled()) {
            trace!(error = %err, severity = %severity, "dropped log record");
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold())
            .field("color", &self.inner.color.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::ports::{MockClock, ProcessExit};
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<(String, bool)>>,
        color: bool,
        broken: bool,
    }

    impl LogSink for RecordingSink {
        fn write_record(&self, record: &LogRecord, color: bool) -> Result<(), ApplicationError> {
            if self.broken {
                return Err(ApplicationError::SinkWrite {
                    reason: "closed".into(),
                });
            }
            let mut lines = self.lines.lock().unwrap();
            for line in record.render_plain() {
                lines.push((line, color));
            }
            Ok(())
        }

        fn write_raw(&self, text: &str) -> Result<(), ApplicationError> {
            self.lines.lock().unwrap().push((text.to_string(), false));
            Ok(())
        }

        fn supports_color(&self) -> bool {
            self.color
        }
    }

    struct NoExit;

    impl ProcessExit for NoExit {
        fn exit(&self, code: u8) -> ! {
            panic!("unexpected exit({code})")
        }
    }

    fn fixed_clock() -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap());
        clock
    }

    fn logger_with(sink: Arc<RecordingSink>) -> Logger {
        let lifecycle = Lifecycle::new(Arc::new(NoExit));
        Logger::new(sink, Arc::new(fixed_clock()), lifecycle)
    }

    fn written(sink: &RecordingSink) -> Vec<String> {
        sink.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(l, _)| l.clone())
            .collect()
    }

    #[test]
    fn default_threshold_hides_debug() {
        let sink = Arc::new(RecordingSink::default());
        let log = logger_with(Arc::clone(&sink));

        log.info("Cleaning up. Done");
        log.debug("hidden");

        assert_eq!(
            written(&sink),
            ["2026-10-19 08:00:00 UTC [     info] Cleaning up. Done"]
        );
    }

    #[test]
    fn threshold_gates_every_severity() {
        for level in 0..=7u8 {
            let sink = Arc::new(RecordingSink::default());
            let log = logger_with(Arc::clone(&sink));
            log.set_threshold(Verbosity::new(level).unwrap());

            log.alert("a");
            log.critical("c");
            log.error("e");
            log.warning("w");
            log.notice("n");
            log.info("i");
            log.debug("d");

            assert_eq!(written(&sink).len(), usize::from(level), "level {level}");
        }
    }

    #[test]
    fn fragments_and_fields_are_joined() {
        let sink = Arc::new(RecordingSink::default());
        let log = logger_with(Arc::clone(&sink));

        log.warning(Message::new("disk").and("almost").and("full").field("free_mb", 12));

        assert_eq!(
            written(&sink),
            ["2026-10-19 08:00:00 UTC [  warning] disk almost full free_mb=12"]
        );
    }

    #[test]
    fn multiline_message_prefixes_every_line() {
        let sink = Arc::new(RecordingSink::default());
        let log = logger_with(Arc::clone(&sink));

        log.error("first\nsecond");

        assert_eq!(
            written(&sink),
            [
                "2026-10-19 08:00:00 UTC [    error] first",
                "2026-10-19 08:00:00 UTC [    error] second",
            ]
        );
    }

    #[test]
    fn color_requires_capable_sink_and_no_opt_out() {
        let sink = Arc::new(RecordingSink {
            color: true,
            ..Default::default()
        });
        let log = logger_with(Arc::clone(&sink));
        assert!(log.color_enabled());

        log.apply_settings(RuntimeSettings {
            log_level: Verbosity::default(),
            no_color: true,
        });
        assert!(!log.color_enabled());

        let plain = logger_with(Arc::new(RecordingSink::default()));
        assert!(!plain.color_enabled());
    }

    #[test]
    fn sink_failures_are_swallowed() {
        let sink = Arc::new(RecordingSink {
            broken: true,
            ..Default::default()
        });
        let log = logger_with(sink);
        log.error("nobody hears this");
        log.info("or this");
    }

    #[test]
    fn log_at_emergency_writes_without_exiting() {
        let sink = Arc::new(RecordingSink::default());
        let log = logger_with(Arc::clone(&sink));
        log.set_threshold(Verbosity::MIN);

        log.log(Severity::Emergency, "going down");
        log.log(Severity::Alert, "filtered");

        assert_eq!(
            written(&sink),
            ["2026-10-19 08:00:00 UTC [emergency] going down"]
        );
    }
}
