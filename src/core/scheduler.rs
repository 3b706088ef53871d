// AppStart - core/scheduler.rs
//
// Configuration handed to the external job-scheduling engine. Built on the
// engine's request, which need not coincide with bootstrap, but always from
// the same `BuildProfile`.

use crate::core::model::{BuildProfile, Severity};
use std::sync::Arc;

/// Immutable scheduler configuration: who builds workers, and how chatty the
/// engine's own logging may be.
#[derive(Debug)]
pub struct JobSchedulerConfig<F: ?Sized> {
    worker_factory: Arc<F>,
    minimum_severity: Severity,
}

impl<F: ?Sized> JobSchedulerConfig<F> {
    /// `Verbose` for debug builds, `Info` otherwise. Total and side-effect free.
    pub fn build(profile: BuildProfile, worker_factory: Arc<F>) -> Self {
        let minimum_severity = match profile {
            BuildProfile::Debug => Severity::Verbose,
            BuildProfile::Release => Severity::Info,
        };
        Self {
            worker_factory,
            minimum_severity,
        }
    }

    pub fn worker_factory(&self) -> &Arc<F> {
        &self.worker_factory
    }

    pub fn minimum_severity(&self) -> Severity {
        self.minimum_severity
    }
}

impl<F: ?Sized> Clone for JobSchedulerConfig<F> {
    fn clone(&self) -> Self {
        Self {
            worker_factory: Arc::clone(&self.worker_factory),
            minimum_severity: self.minimum_severity,
        }
    }
}
