// AppStart - main.rs
//
// Host startup shim. Handles:
// 1. CLI argument parsing
// 2. Platform path resolution and config.toml loading
// 3. Diagnostic logging initialisation (debug mode support)
// 4. Construction of the host collaborators
// 5. A single call to `bootstrap::initialize`
// 6. A short simulated window lifecycle so the sinks see real traffic

use appstart::app::analytics::TracingAnalytics;
use appstart::app::bootstrap::{self, BootstrapDeps, StepOutcome};
use appstart::app::lifecycle::HostLifecycle;
use appstart::app::remote_config::FileRemoteConfig;
use appstart::app::sinks::{CrashLog, LoggingSettings};
use appstart::core::model::{BuildProfile, LifecycleState, LifecycleTransition, LocalePreference};
use appstart::core::redact::PatternRedactor;
use appstart::platform::config::{self, PlatformPaths};
use appstart::platform::prefs::{preferences_path, JsonPreferenceStore};
use appstart::platform::rotating_file::RotatingFileConfig;
use appstart::platform::system_locale::EnvSystemLocale;
use appstart::ui::theme::StaticThemeManager;
use appstart::util;
use appstart::util::constants::{APP_NAME, REMOTE_CONFIG_FILE_NAME};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Background job kinds the scheduler may ask workers for.
#[derive(Debug)]
struct WorkerCatalog {
    kinds: &'static [&'static str],
}

/// Name of the simulated main window.
const MAIN_WINDOW: &str = "MainWindow";

/// AppStart - startup orchestrator with build-profile-dependent log sinks.
#[derive(Parser, Debug)]
#[command(name = "AppStart", version, about)]
struct Cli {
    /// Override the data directory (preferences, remote config, logs).
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Override the directory containing config.toml.
    #[arg(long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Persist a display language ("system" or a code such as "pl") before
    /// starting.
    #[arg(short = 'l', long = "set-language")]
    set_language: Option<String>,

    /// Enable debug diagnostics (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths, applying CLI overrides.
    let defaults = PlatformPaths::resolve();
    let paths = PlatformPaths::from_dirs(
        cli.config_dir.clone().unwrap_or(defaults.config_dir),
        cli.data_dir.clone().unwrap_or(defaults.data_dir),
    );

    // Config is read before logging so its level can seed the filter;
    // warnings are reported once the subscriber exists.
    let (app_config, config_warnings) = config::load_config(&paths.config_dir);
    util::logging::init(cli.debug, app_config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    let profile = BuildProfile::current();
    tracing::info!(
        version = util::constants::APP_VERSION,
        profile = %profile,
        data = %paths.data_dir.display(),
        "AppStart starting"
    );

    let preferences = Arc::new(JsonPreferenceStore::new(preferences_path(&paths.data_dir)));
    if let Some(ref language) = cli.set_language {
        let preference = LocalePreference::from_stored(language);
        match preferences.set_app_language(&preference) {
            Ok(()) => tracing::info!(language = preference.as_stored(), "Language preference saved"),
            Err(e) => tracing::warn!(error = %e, "Could not save language preference"),
        }
    }

    let lifecycle = Arc::new(HostLifecycle::new());
    let crash_log = Arc::new(CrashLog::new());
    let remote_config = Arc::new(FileRemoteConfig::new(
        paths.data_dir.join(REMOTE_CONFIG_FILE_NAME),
        remote_config_defaults(),
    ));

    let deps = BootstrapDeps {
        profile,
        preferences,
        system_locale: Arc::new(EnvSystemLocale),
        analytics: Arc::new(TracingAnalytics),
        theme: Arc::new(StaticThemeManager::new(app_config.theme)),
        remote_config: remote_config.clone(),
        lifecycle: lifecycle.clone(),
        logging: LoggingSettings {
            file: RotatingFileConfig::new(&paths.log_dir)
                .with_max_bytes(app_config.log_file_max_bytes),
            console: Box::new(std::io::stderr()),
            crash_reporter: crash_log.clone(),
            redactor: Arc::new(PatternRedactor::with_default_patterns()),
        },
    };

    let runtime = bootstrap::initialize(deps);
    let registry = runtime.registry();

    for (step, outcome) in runtime.report().steps() {
        match outcome {
            StepOutcome::Completed => {}
            StepOutcome::Degraded(problems) => {
                tracing::warn!(step = step.label(), problems = ?problems, "Startup step degraded")
            }
            StepOutcome::Failed(reason) => {
                tracing::warn!(step = step.label(), reason = %reason, "Startup step failed")
            }
        }
    }

    let scheduler = runtime.job_scheduler_config(Arc::new(WorkerCatalog {
        kinds: &["sync", "notifications", "timetable-widget"],
    }));
    registry.debug(
        "Scheduler",
        format!(
            "worker kinds {:?}, minimum severity {}",
            scheduler.worker_factory().kinds,
            scheduler.minimum_severity()
        ),
    );

    for state in [
        LifecycleState::Created,
        LifecycleState::Started,
        LifecycleState::Resumed,
    ] {
        lifecycle.notify(&LifecycleTransition::new(MAIN_WINDOW, state));
    }

    remote_config.wait_for_fetch();
    registry.info(
        APP_NAME,
        format!(
            "ready: language {}, messages enabled {}",
            runtime.locale().language_tag(),
            remote_config.get_bool("messages_enabled").unwrap_or(false)
        ),
    );

    for state in [
        LifecycleState::Paused,
        LifecycleState::Stopped,
        LifecycleState::Destroyed,
    ] {
        lifecycle.notify(&LifecycleTransition::new(MAIN_WINDOW, state));
    }

    tracing::info!(
        sink_failures = registry.failure_count(),
        breadcrumbs = crash_log.breadcrumbs().len(),
        "AppStart shutting down"
    );
}

/// Values in effect until the remote override file has been read.
fn remote_config_defaults() -> serde_json::Map<String, serde_json::Value> {
    let mut defaults = serde_json::Map::new();
    defaults.insert("messages_enabled".to_string(), serde_json::Value::Bool(true));
    defaults.insert(
        "sync_interval_minutes".to_string(),
        serde_json::Value::from(60),
    );
    defaults
}
