//! The `X-Frame-Options` decision.
//!
//! # Responsibilities
//! - Hold one configuration snapshot (send or not, which value)
//! - Decide the header for a response
//! - Validate operator input before it becomes active
//!
//! # Design Decisions
//! - `value` is an open string: `DENY`, `SAMEORIGIN` and legacy
//!   `ALLOW-FROM <uri>` are all stored verbatim
//! - The constructor never coerces an empty value; boundary code fills the
//!   default explicitly via [`HeaderPolicy::with_default_value`]

use std::fmt;

use axum::http::HeaderValue;

use crate::policy::error::PolicyError;

/// Name of the header this crate manages.
pub const X_FRAME_OPTIONS: &str = "X-Frame-Options";

/// Default for `enabled`.
pub const DEFAULT_SEND_HEADER: bool = true;

/// Default for `value`.
pub const DEFAULT_OPTIONS: &str = "SAMEORIGIN";

/// One immutable snapshot of the header configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPolicy {
    enabled: bool,
    value: String,
}

impl HeaderPolicy {
    /// Build a policy exactly as given.
    pub fn new(enabled: bool, value: impl Into<String>) -> Self {
        Self {
            enabled,
            value: value.into(),
        }
    }

    /// Build a policy, substituting [`DEFAULT_OPTIONS`] for a missing or blank value.
    pub fn with_default_value(enabled: bool, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Self::new(enabled, v),
            _ => Self::new(enabled, DEFAULT_OPTIONS),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The header to emit, if any.
    ///
    /// Returns `None` when sending is disabled or the value is empty, so a
    /// blank header is never produced.
    pub fn header_for(&self) -> Option<(&'static str, &str)> {
        if self.enabled && !self.value.is_empty() {
            Some((X_FRAME_OPTIONS, self.value.as_str()))
        } else {
            None
        }
    }

    /// Wire form of [`header_for`](Self::header_for).
    pub fn header_value(&self) -> Option<HeaderValue> {
        self.header_for()
            .and_then(|(_, value)| HeaderValue::from_str(value).ok())
    }

    /// Check the policy may become active.
    ///
    /// A disabled policy is always accepted. An enabled one needs a value
    /// that is not blank and is legal as an HTTP header value; its content is
    /// otherwise not inspected.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !self.enabled {
            return Ok(());
        }
        if self.value.trim().is_empty() {
            return Err(PolicyError::EmptyValue);
        }
        if HeaderValue::from_str(&self.value).is_err() {
            return Err(PolicyError::IllegalValue(self.value.clone()));
        }
        Ok(())
    }

    pub fn directive(&self) -> Directive {
        Directive::classify(&self.value)
    }
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_HEADER, DEFAULT_OPTIONS)
    }
}

impl fmt::Display for HeaderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(f, "{}: {}", X_FRAME_OPTIONS, self.value)
        } else {
            write!(f, "{} disabled", X_FRAME_OPTIONS)
        }
    }
}

/// What a header value asks the browser to do.
///
/// Informational only: unknown values are kept as [`Directive::Other`] and
/// are still emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// The page cannot be framed at all.
    Deny,
    /// The page can only be framed by its own origin.
    SameOrigin,
    /// Legacy: the page can be framed by the given origin.
    AllowFrom(String),
    Other(String),
}

impl Directive {
    pub fn classify(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("DENY") {
            return Directive::Deny;
        }
        if trimmed.eq_ignore_ascii_case("SAMEORIGIN") {
            return Directive::SameOrigin;
        }
        match trimmed.split_once(char::is_whitespace) {
            Some((head, origin)) if head.eq_ignore_ascii_case("ALLOW-FROM") => {
                Directive::AllowFrom(origin.trim().to_string())
            }
            _ => Directive::Other(trimmed.to_string()),
        }
    }

    /// Short label used in logs and the admin view.
    pub fn label(&self) -> &'static str {
        match self {
            Directive::Deny => "deny",
            Directive::SameOrigin => "sameorigin",
            Directive::AllowFrom(_) => "allow-from",
            Directive::Other(_) => "other",
        }
    }
}
