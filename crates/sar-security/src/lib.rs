//! Redaction engines
//!
//! Both engines are pure functions of (current text, configuration) to new
//! text plus a count of what was replaced. They never match their own
//! marker, so running either one twice yields the same text.

pub mod headers;
pub mod words;

pub use headers::{EMAIL_PATTERN, HeaderField, HeaderRedactor};
pub use words::{MatchMode, WordList, WordRedactor};
