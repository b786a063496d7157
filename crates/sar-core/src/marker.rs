//! Redaction marker
//!
//! The placeholder substituted for every redacted span. A marker must never
//! be matched again by a later pass, so it may not contain anything that
//! looks like an email address (no `@`) and must stay on a single line.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_MARKER: &str = "[REDACTED]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RedactionMarker(String);

impl RedactionMarker {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(Error::InvalidMarker(text, "marker must not be blank"));
        }
        if text.contains(['\n', '\r']) {
            return Err(Error::InvalidMarker(text, "marker must be a single line"));
        }
        if text.contains('@') {
            return Err(Error::InvalidMarker(
                text,
                "marker must not contain '@' (it would look like an email address)",
            ));
        }
        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
            return Err(Error::InvalidMarker(
                text,
                "marker must not start or end with whitespace",
            ));
        }
        // Otherwise "REDACTED@host.org" could be swept up as an address again
        let delimited = |c: Option<char>| c.is_some_and(|c| !is_address_char(c));
        if !delimited(text.chars().next()) || !delimited(text.chars().last()) {
            return Err(Error::InvalidMarker(
                text,
                "marker must start and end with a delimiter such as [ ] < >",
            ));
        }

        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Characters allowed in an email address local part or domain
pub fn is_address_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c)
}

impl Default for RedactionMarker {
    fn default() -> Self {
        Self(DEFAULT_MARKER.to_string())
    }
}

impl fmt::Display for RedactionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RedactionMarker {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RedactionMarker> for String {
    fn from(marker: RedactionMarker) -> Self {
        marker.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_marker() {
        assert_eq!(RedactionMarker::default().as_str(), "[REDACTED]");
    }

    #[test]
    fn test_custom_marker() {
        let marker = RedactionMarker::new("<redacted>").unwrap();
        assert_eq!(marker.to_string(), "<redacted>");
    }

    #[test]
    fn test_rejects_invalid_markers() {
        assert!(RedactionMarker::new("").is_err());
        assert!(RedactionMarker::new("   ").is_err());
        assert!(RedactionMarker::new("a\nb").is_err());
        assert!(RedactionMarker::new("x@y.z").is_err());
        assert!(RedactionMarker::new(" [X]").is_err());
        assert!(RedactionMarker::new("REDACTED").is_err());
        assert!(RedactionMarker::new("***").is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: RedactionMarker = serde_json::from_str("\"[GONE]\"").unwrap();
        assert_eq!(ok.as_str(), "[GONE]");

        let bad: std::result::Result<RedactionMarker, _> = serde_json::from_str("\"a@b.cd\"");
        assert!(bad.is_err());
    }
}
