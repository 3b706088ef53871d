// AppStart - core/redact.rs
//
// Masking of sensitive content before it leaves the process as a crash
// breadcrumb. The breadcrumb sink owns no policy of its own; it asks a
// `Redactor`.

use regex::Regex;

/// Replacement text for masked fragments.
pub const MASK: &str = "***";

/// Decides what part of a message may be attached to crash reports.
pub trait Redactor: Send + Sync {
    /// Return the message to forward, or `None` to omit it entirely.
    fn redact(&self, tag: &str, message: &str) -> Option<String>;
}

/// Forwards messages unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRedaction;

impl Redactor for NoRedaction {
    fn redact(&self, _tag: &str, message: &str) -> Option<String> {
        Some(message.to_string())
    }
}

/// Regex-driven redactor.
///
/// - Messages whose tag is listed in `omitted_tags` are dropped.
/// - Every match of a mask pattern is replaced by [`MASK`]. A pattern with a
///   capture group named `keep` keeps that group and masks the rest of the
///   match (e.g. `password=` stays, the value goes).
#[derive(Debug, Clone)]
pub struct PatternRedactor {
    patterns: Vec<Regex>,
    omitted_tags: Vec<String>,
}

impl PatternRedactor {
    pub fn new(patterns: Vec<Regex>, omitted_tags: Vec<String>) -> Self {
        Self {
            patterns,
            omitted_tags,
        }
    }

    /// Compile user-supplied patterns. Invalid patterns are returned as
    /// errors alongside the redactor built from the valid ones.
    pub fn from_patterns(patterns: &[&str]) -> (Self, Vec<regex::Error>) {
        let mut compiled = Vec::with_capacity(patterns.len());
        let mut errors = Vec::new();
        for p in patterns {
            match Regex::new(p) {
                Ok(re) => compiled.push(re),
                Err(e) => errors.push(e),
            }
        }
        (Self::new(compiled, Vec::new()), errors)
    }

    /// Masks credentials passed as `key=value`/`key: value`, bearer tokens,
    /// and e-mail addresses.
    pub fn with_default_patterns() -> Self {
        const DEFAULTS: &[&str] = &[
            r"(?i)(?P<keep>\b(?:password|passwd|pass|token|secret|pin|session|cookie)\s*[=:]\s*)\S+",
            r"(?i)(?P<keep>\bbearer\s+)[A-Za-z0-9._~+/=-]+",
            r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
        ];
        let (redactor, errors) = Self::from_patterns(DEFAULTS);
        debug_assert!(errors.is_empty(), "built-in redaction patterns must compile");
        redactor
    }

    /// Drop every message carrying `tag`.
    pub fn omit_tag(mut self, tag: impl Into<String>) -> Self {
        self.omitted_tags.push(tag.into());
        self
    }
}

impl Redactor for PatternRedactor {
    fn redact(&self, tag: &str, message: &str) -> Option<String> {
        if self.omitted_tags.iter().any(|t| t == tag) {
            return None;
        }
        let mut out = message.to_string();
        for re in &self.patterns {
            out = re
                .replace_all(&out, |caps: &regex::Captures<'_>| match caps.name("keep") {
                    Some(keep) => format!("{}{MASK}", keep.as_str()),
                    None => MASK.to_string(),
                })
                .into_owned();
        }
        Some(out)
    }
}
