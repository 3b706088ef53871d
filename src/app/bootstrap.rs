// AppStart - app/bootstrap.rs
//
// Process startup sequence. Runs once, synchronously, on the caller's thread:
//
//   1. Locale       resolve the stored preference and apply it (one telemetry event)
//   2. Theme        apply the default theme
//   3. RemoteConfig start remote-config initialisation (not awaited)
//   4. Logging      assemble the log registry for the build profile
//   5. Lifecycle    register the lifecycle logger with the host
//
// Every step runs inside a boundary that catches returned errors and panics.
// A failed step is recorded in the `BootReport` and logged; later steps run
// regardless. Calling `initialize` more than once per process is the host's
// mistake to prevent, not something guarded here.

use crate::app::lifecycle::{ActivityLifecycleLogger, LifecycleNotifier};
use crate::app::remote_config::RemoteConfig;
use crate::app::sinks::{assemble_registry, LoggingSettings};
use crate::core::locale::{
    resolve_preference, ActiveLocale, Analytics, LocaleInitializer, PreferenceStore, SystemLocale,
};
use crate::core::model::BuildProfile;
use crate::core::registry::{panic_message, LogRegistry};
use crate::core::scheduler::JobSchedulerConfig;
use crate::ui::theme::ThemeManager;
use crate::util::error::AppStartError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

// =============================================================================
// Steps and report
// =============================================================================

/// The startup steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootStep {
    Locale,
    Theme,
    RemoteConfig,
    Logging,
    Lifecycle,
}

impl BootStep {
    pub fn all() -> &'static [BootStep] {
        &[
            BootStep::Locale,
            BootStep::Theme,
            BootStep::RemoteConfig,
            BootStep::Logging,
            BootStep::Lifecycle,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            BootStep::Locale => "locale",
            BootStep::Theme => "theme",
            BootStep::RemoteConfig => "remote-config",
            BootStep::Logging => "logging",
            BootStep::Lifecycle => "lifecycle",
        }
    }
}

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Finished, but part of its work is missing (e.g. a sink could not open).
    Degraded(Vec<String>),
    Failed(String),
}

/// Outcome of every step that ran, in execution order.
#[derive(Debug, Default, Clone)]
pub struct BootReport {
    steps: Vec<(BootStep, StepOutcome)>,
}

impl BootReport {
    fn record(&mut self, step: BootStep, outcome: StepOutcome) {
        self.steps.push((step, outcome));
    }

    pub fn steps(&self) -> &[(BootStep, StepOutcome)] {
        &self.steps
    }

    pub fn outcome(&self, step: BootStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| outcome)
    }

    /// True when every step completed without degradation.
    pub fn is_clean(&self) -> bool {
        self.steps
            .iter()
            .all(|(_, o)| matches!(o, StepOutcome::Completed))
    }

    pub fn failed_steps(&self) -> Vec<BootStep> {
        self.steps
            .iter()
            .filter(|(_, o)| matches!(o, StepOutcome::Failed(_)))
            .map(|(s, _)| *s)
            .collect()
    }
}

// =============================================================================
// Dependencies and runtime
// =============================================================================

/// Collaborators supplied by the host. Nothing is looked up globally.
pub struct BootstrapDeps {
    pub profile: BuildProfile,
    pub preferences: Arc<dyn PreferenceStore>,
    pub system_locale: Arc<dyn SystemLocale>,
    pub analytics: Arc<dyn Analytics>,
    pub theme: Arc<dyn ThemeManager>,
    pub remote_config: Arc<dyn RemoteConfig>,
    pub lifecycle: Arc<dyn LifecycleNotifier>,
    pub logging: LoggingSettings,
}

/// Process-wide state that is active once `initialize` returns.
#[derive(Debug)]
pub struct AppRuntime {
    profile: BuildProfile,
    registry: Arc<LogRegistry>,
    locale: ActiveLocale,
    report: BootReport,
}

impl AppRuntime {
    pub fn profile(&self) -> BuildProfile {
        self.profile
    }

    /// The log registry to thread into every call site that logs.
    pub fn registry(&self) -> &Arc<LogRegistry> {
        &self.registry
    }

    pub fn locale(&self) -> &ActiveLocale {
        &self.locale
    }

    pub fn report(&self) -> &BootReport {
        &self.report
    }

    /// Configuration for the job-scheduling engine, built from the same
    /// profile that selected the log sinks.
    pub fn job_scheduler_config<F: ?Sized>(&self, worker_factory: Arc<F>) -> JobSchedulerConfig<F> {
        JobSchedulerConfig::build(self.profile, worker_factory)
    }
}

// =============================================================================
// Sequence
// =============================================================================

/// Run the startup sequence. Never fails; see the returned report for what
/// went wrong.
pub fn initialize(deps: BootstrapDeps) -> AppRuntime {
    let BootstrapDeps {
        profile,
        preferences,
        system_locale,
        analytics,
        theme,
        remote_config,
        lifecycle,
        logging,
    } = deps;

    let started = Instant::now();
    let mut report = BootReport::default();
    tracing::info!(profile = %profile, "Startup sequence begins");

    let locale = run_step(&mut report, BootStep::Locale, || {
        let preference = resolve_preference(preferences.as_ref());
        Ok(LocaleInitializer::new(Arc::clone(&system_locale), analytics).apply(&preference))
    })
    .unwrap_or_else(|| ActiveLocale::FollowSystem(Arc::clone(&system_locale)));

    run_step(&mut report, BootStep::Theme, || theme.apply_default_theme());

    run_step(&mut report, BootStep::RemoteConfig, || remote_config.initialize());

    let registry = match run_step(&mut report, BootStep::Logging, || {
        Ok(assemble_registry(profile, logging))
    }) {
        Some((registry, errors)) => {
            if !errors.is_empty() {
                degrade_last(
                    &mut report,
                    errors.iter().map(ToString::to_string).collect(),
                );
            }
            Arc::new(registry)
        }
        None => Arc::new(LogRegistry::new()),
    };

    let observer = Arc::new(ActivityLifecycleLogger::new(Arc::clone(&registry)));
    run_step(&mut report, BootStep::Lifecycle, || lifecycle.register(observer));

    tracing::info!(
        elapsed = ?started.elapsed(),
        failed = ?report.failed_steps(),
        "Startup sequence finished"
    );

    AppRuntime {
        profile,
        registry,
        locale,
        report,
    }
}

/// Run one step inside a failure boundary and record its outcome.
fn run_step<T>(
    report: &mut BootReport,
    step: BootStep,
    f: impl FnOnce() -> Result<T, AppStartError>,
) -> Option<T> {
    let started = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        Err(AppStartError::Panicked {
            step: step.label(),
            message: panic_message(panic.as_ref()),
        })
    });

    match result {
        Ok(value) => {
            tracing::debug!(
                step = step.label(),
                elapsed = ?started.elapsed(),
                "Startup step completed"
            );
            report.record(step, StepOutcome::Completed);
            Some(value)
        }
        Err(e) => {
            tracing::warn!(step = step.label(), error = %e, "Startup step failed; continuing");
            report.record(step, StepOutcome::Failed(e.to_string()));
            None
        }
    }
}

/// Downgrade the most recently recorded step to `Degraded`.
fn degrade_last(report: &mut BootReport, problems: Vec<String>) {
    if let Some((_, outcome)) = report.steps.last_mut() {
        *outcome = StepOutcome::Degraded(problems);
    }
}
