// AppStart - platform/prefs.rs
//
// Persisted user preferences (currently only the display language).
//
// - Saved atomically (write temp, rename) so a crash mid-save never corrupts
//   the previous file.
// - A missing file is a normal first run and yields the defaults.
// - Any other read problem is returned as an error; the locale step treats it
//   as "follow the system locale".

use crate::core::locale::PreferenceStore;
use crate::core::model::LocalePreference;
use crate::util::constants::{PREFERENCES_FILE_NAME, SYSTEM_LANGUAGE};
use crate::util::error::PreferenceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version stamp for forward-compatibility checks.
pub const PREFERENCES_VERSION: u32 = 1;

/// On-disk shape of `preferences.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesData {
    /// Schema version; must equal `PREFERENCES_VERSION`.
    pub version: u32,

    /// `"system"` or a language code.
    #[serde(rename = "appLanguage", default = "default_app_language")]
    pub app_language: String,
}

fn default_app_language() -> String {
    SYSTEM_LANGUAGE.to_string()
}

impl Default for PreferencesData {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            app_language: default_app_language(),
        }
    }
}

/// Resolve the preferences file path from the platform data directory.
pub fn preferences_path(data_dir: &Path) -> PathBuf {
    data_dir.join(PREFERENCES_FILE_NAME)
}

/// JSON-file-backed preference store.
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored preferences, or defaults when the file does not exist.
    pub fn load(&self) -> Result<PreferencesData, PreferenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No preferences file; using defaults");
                return Ok(PreferencesData::default());
            }
            Err(source) => {
                return Err(PreferenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let data: PreferencesData =
            serde_json::from_str(&content).map_err(|source| PreferenceError::JsonParse {
                path: self.path.clone(),
                source,
            })?;

        if data.version != PREFERENCES_VERSION {
            return Err(PreferenceError::VersionMismatch {
                path: self.path.clone(),
                found: data.version,
                expected: PREFERENCES_VERSION,
            });
        }
        Ok(data)
    }

    /// Save atomically, creating parent directories as needed.
    pub fn save(&self, data: &PreferencesData) -> Result<(), PreferenceError> {
        let io = |source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }

        let json = serde_json::to_string_pretty(data).map_err(|source| {
            PreferenceError::JsonParse {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes()).map_err(io)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            io(e)
        })?;

        tracing::debug!(path = %self.path.display(), "Preferences saved");
        Ok(())
    }

    /// Persist a new language choice. Takes effect on next start.
    pub fn set_app_language(&self, preference: &LocalePreference) -> Result<(), PreferenceError> {
        let mut data = match self.load() {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "Replacing unreadable preferences file");
                PreferencesData::default()
            }
        };
        data.app_language = preference.as_stored().to_string();
        self.save(&data)
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn app_language(&self) -> Result<String, PreferenceError> {
        self.load().map(|d| d.app_language)
    }
}
