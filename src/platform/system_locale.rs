// AppStart - platform/system_locale.rs
//
// Device language detection from the POSIX locale environment.
// Variables are read on every query so a changed environment is picked up
// by anything bound to follow the system locale.

use crate::core::locale::SystemLocale;
use crate::util::constants::FALLBACK_LANGUAGE_TAG;

/// Locale variables in priority order.
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

/// Reads `LC_ALL`, `LC_MESSAGES`, then `LANG`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSystemLocale;

impl SystemLocale for EnvSystemLocale {
    fn language_tag(&self) -> String {
        LOCALE_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| posix_to_language_tag(&value))
            .unwrap_or_else(|| FALLBACK_LANGUAGE_TAG.to_string())
    }
}

/// Convert a POSIX locale name (`pl_PL.UTF-8@euro`) to a language tag
/// (`pl-PL`). Returns `None` for empty, `C` and `POSIX` locales.
pub fn posix_to_language_tag(value: &str) -> Option<String> {
    let base = value
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }

    let mut parts = base.split(['_', '-']);
    let language = parts.next()?.to_ascii_lowercase();
    if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    match parts.next().filter(|r| !r.is_empty()) {
        Some(region) => Some(format!("{language}-{}", region.to_ascii_uppercase())),
        None => Some(language),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_locale_conversion() {
        assert_eq!(posix_to_language_tag("pl_PL.UTF-8").as_deref(), Some("pl-PL"));
        assert_eq!(posix_to_language_tag("de_DE@euro").as_deref(), Some("de-DE"));
        assert_eq!(posix_to_language_tag("en").as_deref(), Some("en"));
        assert_eq!(posix_to_language_tag("EN-gb").as_deref(), Some("en-GB"));
    }

    #[test]
    fn test_neutral_locales_are_rejected() {
        assert_eq!(posix_to_language_tag("C"), None);
        assert_eq!(posix_to_language_tag("POSIX"), None);
        assert_eq!(posix_to_language_tag("C.UTF-8"), None);
        assert_eq!(posix_to_language_tag(""), None);
    }
}
