// AppStart - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "AppStart";

/// Application identifier used for config/data directories and log file names.
pub const APP_ID: &str = "appstart";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Rotating log file
// =============================================================================

/// File name pattern for the rotating log file. `%g` is replaced by the
/// generation slot (`generation % LOG_FILE_GENERATIONS`).
pub const LOG_FILE_NAME_PATTERN: &str = "appstart.%g.log";

/// Placeholder in `LOG_FILE_NAME_PATTERN` substituted with the slot number.
pub const GENERATION_PLACEHOLDER: &str = "%g";

/// File next to the log files recording the current generation counter, so a
/// restarted process continues the FIFO order where the last one stopped.
pub const LOG_GENERATION_FILE_NAME: &str = "appstart.generation";

/// Number of log file generations retained on disk.
pub const LOG_FILE_GENERATIONS: u64 = 10;

/// Size in bytes at which the current log file generation is closed and a
/// new one begins.
pub const DEFAULT_LOG_FILE_MAX_BYTES: u64 = 512 * 1024; // 512 KB

/// Smallest accepted `[logging] file_max_bytes` value.
pub const MIN_LOG_FILE_MAX_BYTES: u64 = 4 * 1024; // 4 KB

/// Largest accepted `[logging] file_max_bytes` value.
pub const MAX_LOG_FILE_MAX_BYTES: u64 = 64 * 1024 * 1024; // 64 MB

// =============================================================================
// Locale and telemetry
// =============================================================================

/// Stored preference value meaning "follow the device language".
pub const SYSTEM_LANGUAGE: &str = "system";

/// Language tag used when the device locale cannot be determined.
pub const FALLBACK_LANGUAGE_TAG: &str = "en";

/// Analytics event name emitted once per start with the resolved language.
pub const LANGUAGE_EVENT: &str = "language";

/// Parameter key carrying the resolved language tag on `LANGUAGE_EVENT`.
pub const LANGUAGE_STARTUP_PARAM: &str = "startup";

// =============================================================================
// Lifecycle
// =============================================================================

/// Log tag used for lifecycle transitions forwarded to the log registry.
pub const LIFECYCLE_LOG_TAG: &str = "ActivityLifecycle";

// =============================================================================
// Logging defaults
// =============================================================================

/// Default diagnostic log level for the tracing subscriber.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// File names
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Persisted user preferences file name.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Remote config override file name.
pub const REMOTE_CONFIG_FILE_NAME: &str = "remote_config.json";

/// Subdirectory of the data directory holding rotating log files.
pub const LOG_DIR_NAME: &str = "logs";
