//! Execution trace adapter built on `tracing-subscriber`.
//!
//! # Mode mapping
//!
//! | Flag | Mode      | Filter | Span events       | Locations |
//! |------|-----------|--------|-------------------|-----------|
//! | `-v` | `Verbose` | DEBUG  | new               | no        |
//! | `-d` | `Full`    | TRACE  | enter + close     | file:line |
//!
//! `RUST_LOG` overrides the filter if set. Output goes to stderr so stdout
//! stays reserved for the script body.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use scriptkit_core::{
    application::{ApplicationError, ports::ExecutionTracer},
    domain::TraceMode,
    error::ScaffoldResult,
};

/// Installs the global tracing subscriber for `-v` / `-d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriberTracer;

/// Trace layer settings for a mode, `None` when tracing is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceProfile {
    pub level: &'static str,
    pub span_events: SpanEvents,
    pub locations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanEvents {
    New,
    EnterClose,
}

impl SpanEvents {
    fn fmt_span(self) -> FmtSpan {
        match self {
            Self::New => FmtSpan::NEW,
            Self::EnterClose => FmtSpan::ENTER | FmtSpan::CLOSE,
        }
    }
}

impl TraceProfile {
    pub fn for_mode(mode: TraceMode) -> Option<Self> {
        match mode {
            TraceMode::Off => None,
            TraceMode::Verbose => Some(Self {
                level: "debug",
                span_events: SpanEvents::New,
                locations: false,
            }),
            TraceMode::Full => Some(Self {
                level: "trace",
                span_events: SpanEvents::EnterClose,
                locations: true,
            }),
        }
    }
}

impl ExecutionTracer for SubscriberTracer {
    fn enable(&self, mode: TraceMode, color: bool) -> ScaffoldResult<()> {
        let Some(profile) = TraceProfile::for_mode(mode) else {
            return Ok(());
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(profile.level));

        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(profile.locations)
            .with_line_number(profile.locations)
            .with_span_events(profile.span_events.fmt_span())
            .with_ansi(color)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| ApplicationError::TracingInit {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
