// AppStart - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance. The data directory is the process-private
// storage root: preferences, remote-config overrides and rotating log files
// live under it.

use crate::core::model::Theme;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for AppStart data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/appstart/).
    pub config_dir: PathBuf,

    /// Private data directory (e.g. ~/.local/share/appstart/).
    pub data_dir: PathBuf,

    /// Rotating log files (`<data_dir>/logs`).
    pub log_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let paths = Self::from_dirs(
                proj_dirs.config_dir().to_path_buf(),
                proj_dirs.data_dir().to_path_buf(),
            );
            tracing::debug!(
                config = %paths.config_dir.display(),
                data = %paths.data_dir.display(),
                logs = %paths.log_dir.display(),
                "Platform paths resolved"
            );
            paths
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self::from_dirs(PathBuf::from("."), PathBuf::from("."))
        }
    }

    /// Build paths from explicit config and data roots (CLI overrides, tests).
    pub fn from_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        let log_dir = data_dir.join(constants::LOG_DIR_NAME);
        Self {
            config_dir,
            data_dir,
            log_dir,
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark", "light" or "system".
    pub theme: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Diagnostic log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Size at which the debug log file starts a new generation.
    pub file_max_bytes: Option<u64>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Theme applied at startup.
    pub theme: Theme,
    /// Diagnostic logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Rotation threshold of the debug log file.
    pub log_file_max_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            log_level: None,
            log_file_max_bytes: constants::DEFAULT_LOG_FILE_MAX_BYTES,
        }
    }
}

/// Path of `config.toml` inside the config directory.
pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(constants::CONFIG_FILE_NAME)
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning;
/// the application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let path = config_path(config_dir);

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: path.clone(),
                source,
            };
            tracing::warn!(error = %err, "Using default configuration");
            return (AppConfig::default(), vec![format!("{err}. Using defaults.")]);
        }
    };

    let (config, warnings) = parse_config(&content, &path);
    tracing::info!(path = %path.display(), warnings = warnings.len(), "Loaded config.toml");
    (config, warnings)
}

/// Parse and validate config text. `path` is used only in messages.
pub fn parse_config(content: &str, path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: path.to_path_buf(),
                source,
            };
            tracing::warn!(error = %err, "Using default configuration");
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    // Validate each field against named constants, accumulating all problems.
    let mut config = AppConfig::default();

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match Theme::parse(theme) {
            Some(t) => config.theme = t,
            None => warnings.push(
                ConfigError::ValueOutOfRange {
                    field: "[ui] theme".to_string(),
                    value: theme.clone(),
                    expected: "\"dark\", \"light\" or \"system\"; using dark".to_string(),
                }
                .to_string(),
            ),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(
                ConfigError::ValueOutOfRange {
                    field: "[logging] level".to_string(),
                    value: level.clone(),
                    expected: "error, warn, info, debug or trace; using info".to_string(),
                }
                .to_string(),
            );
        }
    }

    // -- Logging: file_max_bytes --
    if let Some(bytes) = raw.logging.file_max_bytes {
        if (constants::MIN_LOG_FILE_MAX_BYTES..=constants::MAX_LOG_FILE_MAX_BYTES).contains(&bytes)
        {
            config.log_file_max_bytes = bytes;
        } else {
            warnings.push(
                ConfigError::ValueOutOfRange {
                    field: "[logging] file_max_bytes".to_string(),
                    value: bytes.to_string(),
                    expected: format!(
                        "{}-{}; using {}",
                        constants::MIN_LOG_FILE_MAX_BYTES,
                        constants::MAX_LOG_FILE_MAX_BYTES,
                        constants::DEFAULT_LOG_FILE_MAX_BYTES
                    ),
                }
                .to_string(),
            );
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> (AppConfig, Vec<String>) {
        parse_config(content, Path::new("config.toml"))
    }

    #[test]
    fn test_missing_file_gives_defaults_without_warnings() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = parse(
            r#"
            [ui]
            theme = "Light"

            [logging]
            level = "DEBUG"
            file_max_bytes = 65536
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file_max_bytes, 65536);
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let (config, warnings) = parse(
            r#"
            [ui]
            theme = "neon"

            [logging]
            level = "loud"
            file_max_bytes = 1
            "#,
        );
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert_eq!(config, AppConfig::default());
        assert!(warnings[2].contains("file_max_bytes"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (config, warnings) = parse("[future]\nknob = true\n");
        assert!(warnings.is_empty());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_malformed_toml_gives_defaults_and_warning() {
        let dir = TempDir::new().unwrap();
        std::fs::write(config_path(dir.path()), "[ui\ntheme = ").unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));
    }

    #[test]
    fn test_log_dir_under_data_dir() {
        let paths = PlatformPaths::from_dirs(PathBuf::from("/cfg"), PathBuf::from("/data"));
        assert_eq!(paths.log_dir, PathBuf::from("/data/logs"));
    }
}
