// AppStart - core/registry.rs
//
// Log sink fan-out. Every dispatched event is handed to every planted sink,
// in plant order. A failing sink (returned error or panic) loses that one
// event; the remaining sinks still receive it.
//
// Assembly vs. dispatch:
//   - `plant` takes `&mut self`, so sinks can only be added while the
//     registry is exclusively owned (during bootstrap).
//   - `dispatch` takes `&self`, so once the registry is shared behind an
//     `Arc` it is read-only and safe to call from any thread. No
//     registry-wide lock is taken; sinks that touch shared resources keep
//     their own.

use crate::core::model::{LogEvent, Severity};
use crate::util::error::SinkError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

/// A logging backend. Receives every event and decides independently what
/// to do with it.
pub trait LogSink: Send + Sync {
    /// Short stable name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Handle one event. An `Err` drops the event for this sink only.
    fn handle(&self, event: &LogEvent) -> Result<(), SinkError>;
}

/// Ordered set of sinks owned by the process for its whole lifetime.
#[derive(Default)]
pub struct LogRegistry {
    sinks: Vec<Box<dyn LogSink>>,
    failures: AtomicU64,
}

impl LogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sink. Dispatch order is plant order.
    pub fn plant(&mut self, sink: Box<dyn LogSink>) {
        tracing::debug!(sink = sink.name(), position = self.sinks.len(), "Sink planted");
        self.sinks.push(sink);
    }

    /// Names of the planted sinks, in dispatch order.
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Total number of (sink, event) deliveries that failed since assembly.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Deliver `event` to every sink exactly once, in plant order.
    /// Never fails and never panics because of a sink.
    pub fn dispatch(&self, event: &LogEvent) {
        for sink in &self.sinks {
            let outcome = catch_unwind(AssertUnwindSafe(|| sink.handle(event)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        sink = sink.name(),
                        tag = %event.tag,
                        error = %e,
                        "Sink failed to handle event; event dropped for this sink"
                    );
                }
                Err(panic) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        sink = sink.name(),
                        tag = %event.tag,
                        panic = %panic_message(panic.as_ref()),
                        "Sink panicked while handling event; event dropped for this sink"
                    );
                }
            }
        }
    }

    /// Build and dispatch an event in one call.
    pub fn log(&self, severity: Severity, tag: &str, message: impl Into<String>) {
        self.dispatch(&LogEvent::new(severity, tag, message));
    }

    pub fn verbose(&self, tag: &str, message: impl Into<String>) {
        self.log(Severity::Verbose, tag, message);
    }

    pub fn debug(&self, tag: &str, message: impl Into<String>) {
        self.log(Severity::Debug, tag, message);
    }

    pub fn info(&self, tag: &str, message: impl Into<String>) {
        self.log(Severity::Info, tag, message);
    }

    pub fn warn(&self, tag: &str, message: impl Into<String>) {
        self.log(Severity::Warn, tag, message);
    }

    pub fn error(&self, tag: &str, message: impl Into<String>) {
        self.log(Severity::Error, tag, message);
    }
}

impl std::fmt::Debug for LogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRegistry")
            .field("sinks", &self.sink_names())
            .field("failures", &self.failure_count())
            .finish()
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
