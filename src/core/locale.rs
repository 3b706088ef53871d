// AppStart - core/locale.rs
//
// Display-language resolution at startup.
//
// A `System` preference binds the active language to the device locale
// source itself, so later device changes are visible without re-running
// startup. An explicit preference pins the code. Either way exactly one
// ("language", "startup", <tag>) analytics event is emitted per apply.

use crate::core::model::LocalePreference;
use crate::util::constants::{LANGUAGE_EVENT, LANGUAGE_STARTUP_PARAM};
use crate::util::error::PreferenceError;
use std::sync::Arc;

/// Source of the device's current language tag (e.g. `pl-PL`).
pub trait SystemLocale: Send + Sync {
    fn language_tag(&self) -> String;
}

/// Read access to the persisted `appLanguage` preference.
pub trait PreferenceStore: Send + Sync {
    fn app_language(&self) -> Result<String, PreferenceError>;
}

/// Analytics event sink. Transport is the implementor's concern.
pub trait Analytics: Send + Sync {
    fn log_event(&self, name: &str, params: &[(&str, &str)]);
}

/// The active display-language binding for the rest of the process.
#[derive(Clone)]
pub enum ActiveLocale {
    /// Tracks the device locale dynamically.
    FollowSystem(Arc<dyn SystemLocale>),
    /// Fixed language code.
    Pinned(String),
}

impl ActiveLocale {
    /// Language tag in effect right now.
    pub fn language_tag(&self) -> String {
        match self {
            Self::FollowSystem(system) => system.language_tag(),
            Self::Pinned(code) => code.clone(),
        }
    }

    pub fn follows_system(&self) -> bool {
        matches!(self, Self::FollowSystem(_))
    }
}

impl std::fmt::Debug for ActiveLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FollowSystem(system) => f
                .debug_tuple("FollowSystem")
                .field(&system.language_tag())
                .finish(),
            Self::Pinned(code) => f.debug_tuple("Pinned").field(code).finish(),
        }
    }
}

/// Read the stored preference, falling back to `System` when the store
/// cannot be read.
pub fn resolve_preference(store: &dyn PreferenceStore) -> LocalePreference {
    match store.app_language() {
        Ok(value) => LocalePreference::from_stored(&value),
        Err(e) => {
            tracing::warn!(error = %e, "Language preference unreadable; following system locale");
            LocalePreference::System
        }
    }
}

/// Applies a `LocalePreference` and reports it to analytics.
pub struct LocaleInitializer {
    system: Arc<dyn SystemLocale>,
    analytics: Arc<dyn Analytics>,
}

impl LocaleInitializer {
    pub fn new(system: Arc<dyn SystemLocale>, analytics: Arc<dyn Analytics>) -> Self {
        Self { system, analytics }
    }

    pub fn apply(&self, preference: &LocalePreference) -> ActiveLocale {
        let (active, reported) = match preference {
            LocalePreference::System => {
                let snapshot = self.system.language_tag();
                (ActiveLocale::FollowSystem(Arc::clone(&self.system)), snapshot)
            }
            LocalePreference::Explicit(code) => (ActiveLocale::Pinned(code.clone()), code.clone()),
        };

        self.analytics
            .log_event(LANGUAGE_EVENT, &[(LANGUAGE_STARTUP_PARAM, reported.as_str())]);

        tracing::info!(
            language = %reported,
            follows_system = active.follows_system(),
            "Display language applied"
        );
        active
    }
}
