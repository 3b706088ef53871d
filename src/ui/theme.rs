// AppStart - ui/theme.rs
//
// Theme activation at startup. Rendering belongs to the host UI toolkit;
// this layer only decides which theme is active and tells it so.

use crate::core::model::Theme;
use crate::util::error::AppStartError;
use std::sync::RwLock;

/// Applies the default visual theme. Called once during bootstrap.
pub trait ThemeManager: Send + Sync {
    fn apply_default_theme(&self) -> Result<(), AppStartError>;
}

/// Theme manager with a fixed default (from `config.toml`), remembering
/// which theme is active so the host UI can read it when it starts drawing.
#[derive(Debug)]
pub struct StaticThemeManager {
    default_theme: Theme,
    active: RwLock<Option<Theme>>,
}

impl StaticThemeManager {
    pub fn new(default_theme: Theme) -> Self {
        Self {
            default_theme,
            active: RwLock::new(None),
        }
    }

    /// Theme applied so far, `None` before bootstrap.
    pub fn active(&self) -> Option<Theme> {
        *self
            .active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ThemeManager for StaticThemeManager {
    fn apply_default_theme(&self) -> Result<(), AppStartError> {
        *self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(self.default_theme);
        tracing::debug!(theme = self.default_theme.label(), "Default theme applied");
        Ok(())
    }
}
