// AppStart - app/lifecycle.rs
//
// Coarse usage logging of host window/activity lifecycle transitions.
// Each transition becomes an Info event on the log registry.

use crate::core::model::{LifecycleTransition, LogEvent, Severity};
use crate::core::registry::LogRegistry;
use crate::util::constants::LIFECYCLE_LOG_TAG;
use crate::util::error::AppStartError;
use std::sync::{Arc, RwLock};

/// Receives lifecycle transitions from the host.
pub trait LifecycleObserver: Send + Sync {
    fn on_transition(&self, transition: &LifecycleTransition);
}

/// The host's process-wide lifecycle notifier.
pub trait LifecycleNotifier: Send + Sync {
    fn register(&self, observer: Arc<dyn LifecycleObserver>) -> Result<(), AppStartError>;
}

/// Forwards transitions to the log registry.
pub struct ActivityLifecycleLogger {
    registry: Arc<LogRegistry>,
}

impl ActivityLifecycleLogger {
    pub fn new(registry: Arc<LogRegistry>) -> Self {
        Self { registry }
    }
}

impl LifecycleObserver for ActivityLifecycleLogger {
    fn on_transition(&self, transition: &LifecycleTransition) {
        self.registry.dispatch(&LogEvent::new(
            Severity::Info,
            LIFECYCLE_LOG_TAG,
            format!("{} {}", transition.component, transition.state.label()),
        ));
    }
}

/// In-process notifier for hosts without their own lifecycle framework.
#[derive(Default)]
pub struct HostLifecycle {
    observers: RwLock<Vec<Arc<dyn LifecycleObserver>>>,
}

impl HostLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `transition` to every registered observer, in registration order.
    pub fn notify(&self, transition: &LifecycleTransition) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for observer in observers {
            observer.on_transition(transition);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl LifecycleNotifier for HostLifecycle {
    fn register(&self, observer: Arc<dyn LifecycleObserver>) -> Result<(), AppStartError> {
        self.observers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(observer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LifecycleState;
    use crate::core::registry::LogSink;
    use crate::util::error::SinkError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture(Mutex<Vec<(Severity, String, String)>>);

    impl LogSink for Arc<Capture> {
        fn name(&self) -> &'static str {
            "capture"
        }

        fn handle(&self, event: &LogEvent) -> Result<(), SinkError> {
            self.0.lock().unwrap().push((
                event.severity,
                event.tag.clone(),
                event.message.clone(),
            ));
            Ok(())
        }
    }

    #[test]
    fn test_transitions_become_info_events() {
        let capture = Arc::new(Capture::default());
        let mut registry = LogRegistry::new();
        registry.plant(Box::new(Arc::clone(&capture)));
        let registry = Arc::new(registry);

        let host = HostLifecycle::new();
        host.register(Arc::new(ActivityLifecycleLogger::new(registry)))
            .unwrap();
        assert_eq!(host.observer_count(), 1);

        host.notify(&LifecycleTransition::new("MainWindow", LifecycleState::Created));
        host.notify(&LifecycleTransition::new("MainWindow", LifecycleState::Resumed));

        let events = capture.0.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                (
                    Severity::Info,
                    "ActivityLifecycle".to_string(),
                    "MainWindow CREATED".to_string()
                ),
                (
                    Severity::Info,
                    "ActivityLifecycle".to_string(),
                    "MainWindow RESUMED".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_notify_without_observers_is_noop() {
        HostLifecycle::new().notify(&LifecycleTransition::new("W", LifecycleState::Stopped));
    }
}
