// AppStart - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Build profile
// =============================================================================

/// Classification of the running binary, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    /// Profile of this binary, taken from the build-time debug flag.
    pub const fn current() -> Self {
        Self::from_is_debug(cfg!(debug_assertions))
    }

    pub const fn from_is_debug(is_debug: bool) -> Self {
        if is_debug {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, Self::Debug)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Log event severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Severity {
    Verbose,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Verbose => "Verbose",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warn => "Warn",
            Severity::Error => "Error",
        }
    }

    /// Single-letter code used in log file and console lines.
    pub fn code(&self) -> char {
        match self {
            Severity::Verbose => 'V',
            Severity::Debug => 'D',
            Severity::Info => 'I',
            Severity::Warn => 'W',
            Severity::Error => 'E',
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Log event
// =============================================================================

/// Error value attached to a log event.
pub type Throwable = Arc<dyn Error + Send + Sync + 'static>;

/// A single log call, delivered read-only to every planted sink.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub severity: Severity,
    pub tag: String,
    pub message: String,
    pub throwable: Option<Throwable>,
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    pub fn new(severity: Severity, tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            tag: tag.into(),
            message: message.into(),
            throwable: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach an error value. Crash-exception capture only forwards events
    /// carrying one.
    pub fn with_throwable<E>(mut self, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.throwable = Some(Arc::new(error));
        self
    }

    /// Render as a single line:
    /// `<RFC3339 timestamp> <code>/<tag>: <message>[ | <throwable>]`.
    pub fn format_line(&self) -> String {
        let mut line = format!(
            "{} {}/{}: {}",
            self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            self.severity.code(),
            self.tag,
            self.message
        );
        if let Some(ref t) = self.throwable {
            line.push_str(" | ");
            line.push_str(&t.to_string());
        }
        line
    }
}

// =============================================================================
// Locale preference
// =============================================================================

/// Stored display-language choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocalePreference {
    /// Follow the device language, including later changes.
    #[default]
    System,
    /// Fixed language code, e.g. `en` or `pl`.
    Explicit(String),
}

impl LocalePreference {
    /// Interpret the raw `appLanguage` value. Blank values mean `System`.
    pub fn from_stored(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == crate::util::constants::SYSTEM_LANGUAGE {
            Self::System
        } else {
            Self::Explicit(trimmed.to_string())
        }
    }

    /// Raw value as persisted.
    pub fn as_stored(&self) -> &str {
        match self {
            Self::System => crate::util::constants::SYSTEM_LANGUAGE,
            Self::Explicit(code) => code,
        }
    }
}

// =============================================================================
// Theme
// =============================================================================

/// Visual theme selected in `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    /// Follow the desktop/system appearance.
    System,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            "system" => Some(Theme::System),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
        }
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Coarse lifecycle state of a host window/activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    SaveInstanceState,
    Destroyed,
}

impl LifecycleState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Started => "STARTED",
            Self::Resumed => "RESUMED",
            Self::Paused => "PAUSED",
            Self::Stopped => "STOPPED",
            Self::SaveInstanceState => "SAVE_INSTANCE_STATE",
            Self::Destroyed => "DESTROYED",
        }
    }
}

/// One transition reported by the host's lifecycle notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleTransition {
    /// Name of the window/activity that changed state.
    pub component: String,
    pub state: LifecycleState,
}

impl LifecycleTransition {
    pub fn new(component: impl Into<String>, state: LifecycleState) -> Self {
        Self {
            component: component.into(),
            state,
        }
    }
}
