// AppStart - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Nothing in this crate is fatal to startup: these types exist so that
// failures can be reported precisely before being isolated and logged.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure of a startup step, as recorded in the boot report.
/// Subsystem errors below are isolated where they occur and never reach it.
#[derive(Debug)]
pub enum AppStartError {
    /// An external collaborator (theme, remote config, lifecycle host)
    /// reported a failure.
    Collaborator {
        collaborator: &'static str,
        reason: String,
    },

    /// A startup step panicked and the panic was contained.
    Panicked { step: &'static str, message: String },
}

impl AppStartError {
    /// Shorthand for a collaborator failure.
    pub fn collaborator(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AppStartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collaborator {
                collaborator,
                reason,
            } => write!(f, "{collaborator} failed: {reason}"),
            Self::Panicked { step, message } => {
                write!(f, "Startup step '{step}' panicked: {message}")
            }
        }
    }
}

impl std::error::Error for AppStartError {}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

/// Errors raised by a single log sink.
#[derive(Debug)]
pub enum SinkError {
    /// File or stream I/O failed.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },

    /// The sink configuration is unusable.
    InvalidConfig { sink: &'static str, reason: String },

    /// The backend behind the sink rejected the event.
    Backend { sink: &'static str, reason: String },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
            Self::InvalidConfig { sink, reason } => {
                write!(f, "Invalid configuration for {sink}: {reason}")
            }
            Self::Backend { sink, reason } => write!(f, "{sink} backend rejected event: {reason}"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Preference errors
// ---------------------------------------------------------------------------

/// Errors related to the persisted preference store.
#[derive(Debug)]
pub enum PreferenceError {
    /// The preference file could not be read or written.
    Io { path: PathBuf, source: io::Error },

    /// The preference file is not valid JSON for the expected shape.
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The preference file was written by an incompatible version.
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Preference I/O error '{}': {source}", path.display())
            }
            Self::JsonParse { path, source } => {
                write!(f, "Malformed preference file '{}': {source}", path.display())
            }
            Self::VersionMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "Preference file '{}' has version {found}, expected {expected}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for PreferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::JsonParse { source, .. } => Some(source),
            Self::VersionMismatch { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_sink_io_error_preserves_source_chain() {
        let err = SinkError::Io {
            path: PathBuf::from("/tmp/appstart.0.log"),
            operation: "append",
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };

        let msg = err.to_string();
        assert!(msg.contains("append"), "{msg}");
        assert!(msg.contains("appstart.0.log"), "{msg}");

        let io = err.source().expect("io error source");
        assert_eq!(io.to_string(), "disk full");
    }

    #[test]
    fn test_collaborator_error_display() {
        let err = AppStartError::collaborator("theme manager", "no display");
        assert_eq!(err.to_string(), "theme manager failed: no display");
        assert!(err.source().is_none());
    }
}
