// AppStart - app/sinks.rs
//
// Concrete log sinks and the per-profile selection policy.
//
//   Debug:   ConsoleVerboseSink, RotatingFileSink (>= Debug, 10 generations)
//   Release: CrashExceptionSink (throwables only), CrashBreadcrumbSink
//
// The crash-reporting backend and the masking policy are collaborators
// (`CrashReporter`, `Redactor`); these sinks only route events to them.

use crate::core::model::{BuildProfile, LogEvent, Severity, Throwable};
use crate::core::redact::Redactor;
use crate::core::registry::{LogRegistry, LogSink};
use crate::platform::rotating_file::{RotatingFileConfig, RotatingFileSink};
use crate::util::error::SinkError;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Breadcrumbs retained by [`CrashLog`] for attaching to the next report.
pub const MAX_BREADCRUMBS: usize = 64;

/// Captured exceptions retained by [`CrashLog`]; older ones are discarded.
pub const MAX_CAPTURED_EXCEPTIONS: usize = 32;

// =============================================================================
// Crash reporting collaborator
// =============================================================================

/// Non-fatal context attached to future crash reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub tag: String,
    pub message: String,
}

/// An error captured from a log event.
#[derive(Debug, Clone)]
pub struct ExceptionReport {
    pub timestamp: DateTime<Utc>,
    pub tag: String,
    pub message: String,
    pub error: Throwable,
}

/// Crash/exception capture backend.
pub trait CrashReporter: Send + Sync {
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) -> Result<(), SinkError>;
    fn record_exception(&self, report: ExceptionReport) -> Result<(), SinkError>;
}

/// An exception together with the breadcrumb trail that preceded it.
#[derive(Debug, Clone)]
pub struct CapturedException {
    pub report: ExceptionReport,
    pub trail: Vec<Breadcrumb>,
}

#[derive(Debug, Default)]
struct CrashLogState {
    breadcrumbs: VecDeque<Breadcrumb>,
    exceptions: VecDeque<CapturedException>,
}

/// In-process crash reporter: keeps the last [`MAX_BREADCRUMBS`] breadcrumbs
/// and snapshots them into each of the last [`MAX_CAPTURED_EXCEPTIONS`]
/// recorded exceptions. Uploading is the host's business; captured
/// exceptions are also emitted as `tracing` errors.
#[derive(Debug, Default)]
pub struct CrashLog {
    state: Mutex<CrashLogState>,
}

impl CrashLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.lock().breadcrumbs.iter().cloned().collect()
    }

    pub fn exceptions(&self) -> Vec<CapturedException> {
        self.lock().exceptions.iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CrashLogState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CrashReporter for CrashLog {
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) -> Result<(), SinkError> {
        let mut state = self.lock();
        if state.breadcrumbs.len() == MAX_BREADCRUMBS {
            state.breadcrumbs.pop_front();
        }
        state.breadcrumbs.push_back(breadcrumb);
        Ok(())
    }

    fn record_exception(&self, report: ExceptionReport) -> Result<(), SinkError> {
        tracing::error!(
            tag = %report.tag,
            message = %report.message,
            error = %report.error,
            "Exception captured for crash report"
        );
        let mut state = self.lock();
        let trail = state.breadcrumbs.iter().cloned().collect();
        if state.exceptions.len() == MAX_CAPTURED_EXCEPTIONS {
            state.exceptions.pop_front();
        }
        state.exceptions.push_back(CapturedException { report, trail });
        Ok(())
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Writes every event, whatever its severity, to a console stream.
pub struct ConsoleVerboseSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleVerboseSink {
    pub const NAME: &'static str = "console-verbose";

    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }
}

impl LogSink for ConsoleVerboseSink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handle(&self, event: &LogEvent) -> Result<(), SinkError> {
        let mut line = event.format_line();
        line.push('\n');
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| SinkError::Io {
                path: "<console>".into(),
                operation: "write",
                source,
            })
    }
}

/// Forwards events that carry an error value to the crash reporter.
pub struct CrashExceptionSink {
    reporter: Arc<dyn CrashReporter>,
}

impl CrashExceptionSink {
    pub const NAME: &'static str = "crash-exception";

    pub fn new(reporter: Arc<dyn CrashReporter>) -> Self {
        Self { reporter }
    }
}

impl LogSink for CrashExceptionSink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handle(&self, event: &LogEvent) -> Result<(), SinkError> {
        let Some(ref error) = event.throwable else {
            return Ok(());
        };
        self.reporter.record_exception(ExceptionReport {
            timestamp: event.timestamp,
            tag: event.tag.clone(),
            message: event.message.clone(),
            error: Arc::clone(error),
        })
    }
}

/// Forwards every event as a breadcrumb after masking.
pub struct CrashBreadcrumbSink {
    reporter: Arc<dyn CrashReporter>,
    redactor: Arc<dyn Redactor>,
}

impl CrashBreadcrumbSink {
    pub const NAME: &'static str = "crash-breadcrumb";

    pub fn new(reporter: Arc<dyn CrashReporter>, redactor: Arc<dyn Redactor>) -> Self {
        Self { reporter, redactor }
    }
}

impl LogSink for CrashBreadcrumbSink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handle(&self, event: &LogEvent) -> Result<(), SinkError> {
        let Some(message) = self.redactor.redact(&event.tag, &event.message) else {
            return Ok(());
        };
        self.reporter.add_breadcrumb(Breadcrumb {
            timestamp: event.timestamp,
            severity: event.severity,
            tag: event.tag.clone(),
            message,
        })
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Everything needed to build either profile's sinks.
pub struct LoggingSettings {
    pub file: RotatingFileConfig,
    pub console: Box<dyn Write + Send>,
    pub crash_reporter: Arc<dyn CrashReporter>,
    pub redactor: Arc<dyn Redactor>,
}

/// Build the sinks for `profile`, in plant order.
///
/// A sink that cannot be constructed (e.g. unwritable log directory) is left
/// out and its error returned; the others are still built.
pub fn select_sinks(
    profile: BuildProfile,
    settings: LoggingSettings,
) -> (Vec<Box<dyn LogSink>>, Vec<SinkError>) {
    let mut sinks: Vec<Box<dyn LogSink>> = Vec::new();
    let mut errors = Vec::new();

    match profile {
        BuildProfile::Debug => {
            sinks.push(Box::new(ConsoleVerboseSink::new(settings.console)));
            match RotatingFileSink::open(settings.file) {
                Ok(file) => sinks.push(Box::new(file)),
                Err(e) => errors.push(e),
            }
        }
        BuildProfile::Release => {
            sinks.push(Box::new(CrashExceptionSink::new(Arc::clone(
                &settings.crash_reporter,
            ))));
            sinks.push(Box::new(CrashBreadcrumbSink::new(
                settings.crash_reporter,
                settings.redactor,
            )));
        }
    }

    (sinks, errors)
}

/// Select and plant the sinks for `profile` into a fresh registry.
pub fn assemble_registry(
    profile: BuildProfile,
    settings: LoggingSettings,
) -> (LogRegistry, Vec<SinkError>) {
    let (sinks, errors) = select_sinks(profile, settings);
    let mut registry = LogRegistry::new();
    for sink in sinks {
        registry.plant(sink);
    }
    for e in &errors {
        tracing::warn!(profile = %profile, error = %e, "Log sink unavailable");
    }
    tracing::info!(profile = %profile, sinks = ?registry.sink_names(), "Log registry assembled");
    (registry, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::redact::{NoRedaction, PatternRedactor};
    use std::io;
    use tempfile::TempDir;

    /// `Write` into a shared buffer so tests can read console output.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn settings(dir: &TempDir, console: SharedBuf, crash: Arc<CrashLog>) -> LoggingSettings {
        LoggingSettings {
            file: RotatingFileConfig::new(dir.path()),
            console: Box::new(console),
            crash_reporter: crash,
            redactor: Arc::new(PatternRedactor::with_default_patterns()),
        }
    }

    #[test]
    fn test_debug_profile_plants_console_and_file() {
        let dir = TempDir::new().unwrap();
        let (registry, errors) = assemble_registry(
            BuildProfile::Debug,
            settings(&dir, SharedBuf::default(), Arc::new(CrashLog::new())),
        );
        assert!(errors.is_empty());
        assert_eq!(
            registry.sink_names(),
            vec![ConsoleVerboseSink::NAME, RotatingFileSink::NAME]
        );
    }

    #[test]
    fn test_release_profile_plants_crash_sinks() {
        let dir = TempDir::new().unwrap();
        let (registry, errors) = assemble_registry(
            BuildProfile::Release,
            settings(&dir, SharedBuf::default(), Arc::new(CrashLog::new())),
        );
        assert!(errors.is_empty());
        assert_eq!(
            registry.sink_names(),
            vec![CrashExceptionSink::NAME, CrashBreadcrumbSink::NAME]
        );
        assert!(
            std::fs::read_dir(dir.path()).unwrap().next().is_none(),
            "release profile must not create log files"
        );
    }

    #[test]
    fn test_unwritable_log_dir_still_plants_console() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let mut s = settings(&dir, SharedBuf::default(), Arc::new(CrashLog::new()));
        s.file = RotatingFileConfig::new(blocker.join("logs"));

        let (registry, errors) = assemble_registry(BuildProfile::Debug, s);
        assert_eq!(registry.sink_names(), vec![ConsoleVerboseSink::NAME]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_console_passes_verbose() {
        let buf = SharedBuf::default();
        let sink = ConsoleVerboseSink::new(Box::new(buf.clone()));
        sink.handle(&LogEvent::new(Severity::Verbose, "Ui", "frame drawn"))
            .unwrap();
        assert!(buf.text().contains("V/Ui: frame drawn"));
    }

    #[test]
    fn test_exception_sink_only_forwards_throwables() {
        let crash = Arc::new(CrashLog::new());
        let sink = CrashExceptionSink::new(crash.clone());

        sink.handle(&LogEvent::new(Severity::Error, "Sync", "no error attached"))
            .unwrap();
        assert!(crash.exceptions().is_empty());

        let event = LogEvent::new(Severity::Warn, "Sync", "fetch failed")
            .with_throwable(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        sink.handle(&event).unwrap();

        let captured = crash.exceptions();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].report.error.to_string(), "reset");
        assert!(crash.breadcrumbs().is_empty(), "exception sink adds no breadcrumbs");
    }

    #[test]
    fn test_breadcrumb_sink_masks_and_forwards_all() {
        let crash = Arc::new(CrashLog::new());
        let redactor = Arc::new(PatternRedactor::with_default_patterns().omit_tag("Secrets"));
        let sink = CrashBreadcrumbSink::new(crash.clone(), redactor);

        sink.handle(&LogEvent::new(Severity::Verbose, "Login", "token=abc123"))
            .unwrap();
        sink.handle(&LogEvent::new(Severity::Info, "Secrets", "vault opened"))
            .unwrap();

        let crumbs = crash.breadcrumbs();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].message, "token=***");
        assert_eq!(crumbs[0].severity, Severity::Verbose);
    }

    #[test]
    fn test_exception_snapshot_includes_trail() {
        let crash = Arc::new(CrashLog::new());
        let mut registry = LogRegistry::new();
        registry.plant(Box::new(CrashExceptionSink::new(crash.clone())));
        registry.plant(Box::new(CrashBreadcrumbSink::new(
            crash.clone(),
            Arc::new(NoRedaction),
        )));

        registry.info("Nav", "opened grades");
        registry.dispatch(
            &LogEvent::new(Severity::Error, "Grades", "render failed")
                .with_throwable(io::Error::new(io::ErrorKind::InvalidData, "bad row")),
        );

        let captured = crash.exceptions();
        assert_eq!(captured.len(), 1);
        // The exception sink runs before the breadcrumb sink, so the trail
        // holds only what came before the failing event.
        assert_eq!(captured[0].trail.len(), 1);
        assert_eq!(captured[0].trail[0].message, "opened grades");
        assert_eq!(crash.breadcrumbs().len(), 2);
    }

    #[test]
    fn test_breadcrumb_ring_is_bounded() {
        let crash = CrashLog::new();
        for i in 0..(MAX_BREADCRUMBS + 5) {
            crash
                .add_breadcrumb(Breadcrumb {
                    timestamp: Utc::now(),
                    severity: Severity::Info,
                    tag: "T".to_string(),
                    message: i.to_string(),
                })
                .unwrap();
        }
        let crumbs = crash.breadcrumbs();
        assert_eq!(crumbs.len(), MAX_BREADCRUMBS);
        assert_eq!(crumbs[0].message, "5");
    }

    #[test]
    fn test_captured_exceptions_are_bounded() {
        let crash = Arc::new(CrashLog::new());
        let sink = CrashExceptionSink::new(crash.clone());
        for i in 0..(MAX_CAPTURED_EXCEPTIONS * 100) {
            let event = LogEvent::new(Severity::Error, "Sync", format!("failure {i}"))
                .with_throwable(io::Error::new(io::ErrorKind::Other, "boom"));
            sink.handle(&event).unwrap();
        }

        let captured = crash.exceptions();
        assert_eq!(captured.len(), MAX_CAPTURED_EXCEPTIONS);
        let first_kept = MAX_CAPTURED_EXCEPTIONS * 99;
        assert_eq!(captured[0].report.message, format!("failure {first_kept}"));
        assert_eq!(
            captured[MAX_CAPTURED_EXCEPTIONS - 1].report.message,
            format!("failure {}", MAX_CAPTURED_EXCEPTIONS * 100 - 1)
        );
    }
}
