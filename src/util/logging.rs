// AppStart - util/logging.rs
//
// Process diagnostics with runtime-selectable debug mode.
//
// These are the orchestrator's own diagnostics (step failures, sink failures,
// config warnings). Application log events flow through
// `core::registry::LogRegistry` instead and never reach this subscriber
// unless a sink forwards them here.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"

use tracing_subscriber::EnvFilter;

/// Pick the filter directive with the documented priority:
/// RUST_LOG env var > CLI --debug flag > config level > default "info".
///
/// Returns `None` when `RUST_LOG` should be used verbatim.
pub fn filter_directive(
    rust_log_set: bool,
    debug_flag: bool,
    config_level: Option<&str>,
) -> Option<String> {
    if rust_log_set {
        None
    } else if debug_flag {
        Some("debug".to_string())
    } else if let Some(level) = config_level {
        Some(level.to_string())
    } else {
        Some(super::constants::DEFAULT_LOG_LEVEL.to_string())
    }
}

/// Initialise the diagnostic logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
///
/// Safe to call more than once: later calls are ignored.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let rust_log_set = std::env::var("RUST_LOG").is_ok();
    let filter = match filter_directive(rust_log_set, debug_flag, config_level) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::from_default_env(),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            app = super::constants::APP_NAME,
            version = super::constants::APP_VERSION,
            "Logging initialised"
        );
    }
}
