//! Word list redaction
//!
//! The word list is re-read on every run. Redaction always works on the
//! current file content and never looks inside an existing marker, so adding
//! terms and running again only touches the new terms' occurrences.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use sar_core::{Error, RedactionInfo, RedactionMarker, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a term has to sit in the surrounding text to count as a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Term edges that are word characters must not touch other word characters
    #[default]
    Word,
    /// Anywhere, including inside longer words
    Substring,
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "word" => Ok(MatchMode::Word),
            "substring" => Ok(MatchMode::Substring),
            other => Err(Error::Config(format!(
                "unknown match mode '{}' (expected 'word' or 'substring')",
                other
            ))),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Word => f.write_str("word"),
            MatchMode::Substring => f.write_str("substring"),
        }
    }
}

/// Operator-maintained terms, one per line, deduplicated case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    terms: Vec<String>,
}

impl WordList {
    pub fn parse(content: &str) -> Self {
        let mut terms: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for line in content.trim_start_matches('\u{feff}').lines() {
            let term = line.trim();
            if term.is_empty() {
                continue;
            }
            if seen.insert(dedup_key(term)) {
                terms.push(term.to_string());
            }
        }

        Self { terms }
    }

    /// Load the list; a missing or unreadable file is an empty list
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Word list not found: {}", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Cannot read word list {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn dedup_key(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

struct TermRule {
    term: String,
    pattern: Regex,
    /// Position in the word list, for reporting in list order
    index: usize,
}

pub struct WordRedactor {
    marker: RedactionMarker,
    mode: MatchMode,
    rules: Vec<TermRule>,
}

impl WordRedactor {
    pub fn new(list: &WordList, mode: MatchMode, marker: RedactionMarker) -> Result<Self> {
        let mut rules = Vec::with_capacity(list.len());

        for (index, term) in list.terms().iter().enumerate() {
            // Phrases match across any run of whitespace, including line breaks
            let pattern = term
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            let pattern = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::Other(e.into()))?;

            rules.push(TermRule {
                term: term.clone(),
                pattern,
                index,
            });
        }

        // Longest first so a phrase wins over the words inside it
        rules.sort_by(|a, b| b.term.chars().count().cmp(&a.term.chars().count()));
        debug!("Compiled {} word list terms ({} mode)", rules.len(), mode);

        Ok(Self {
            marker,
            mode,
            rules,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replace every term occurrence; returns the hits per term in list order
    pub fn redact(&self, content: &str) -> (String, Vec<RedactionInfo>) {
        let mut result = content.to_string();
        let mut hits: Vec<(usize, RedactionInfo)> = Vec::new();

        for rule in &self.rules {
            let (next, count) = self.replace_outside_markers(&result, rule);
            if count > 0 {
                result = next;
                hits.push((
                    rule.index,
                    RedactionInfo {
                        redaction_type: rule.term.clone(),
                        count,
                    },
                ));
            }
        }

        hits.sort_by_key(|(index, _)| *index);
        (result, hits.into_iter().map(|(_, info)| info).collect())
    }

    fn replace_outside_markers(&self, text: &str, rule: &TermRule) -> (String, usize) {
        let marker = self.marker.as_str();
        let mut out = String::with_capacity(text.len());
        let mut count = 0;
        let mut rest = text;

        while let Some(pos) = rest.find(marker) {
            count += self.replace_in_segment(&rest[..pos], rule, &mut out);
            out.push_str(marker);
            rest = &rest[pos + marker.len()..];
        }
        count += self.replace_in_segment(rest, rule, &mut out);

        (out, count)
    }

    fn replace_in_segment(&self, segment: &str, rule: &TermRule, out: &mut String) -> usize {
        let mut count = 0;
        let mut copied = 0;
        let mut search = 0;

        while search <= segment.len() {
            let Some(m) = rule.pattern.find_at(segment, search) else {
                break;
            };

            if self.mode == MatchMode::Word && !on_word_boundaries(segment, m.start(), m.end()) {
                // Retry one character further on
                search = m.start()
                    + segment[m.start()..]
                        .chars()
                        .next()
                        .map(char::len_utf8)
                        .unwrap_or(1);
                continue;
            }

            out.push_str(&segment[copied..m.start()]);
            out.push_str(self.marker.as_str());
            copied = m.end();
            search = m.end().max(m.start() + 1);
            count += 1;
        }

        out.push_str(&segment[copied..]);
        count
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn on_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let matched = &text[start..end];

    let starts_word = matched.chars().next().is_some_and(is_word_char);
    if starts_word && text[..start].chars().next_back().is_some_and(is_word_char) {
        return false;
    }

    let ends_word = matched.chars().next_back().is_some_and(is_word_char);
    if ends_word && text[end..].chars().next().is_some_and(is_word_char) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redactor(terms: &str, mode: MatchMode) -> WordRedactor {
        WordRedactor::new(&WordList::parse(terms), mode, RedactionMarker::default()).unwrap()
    }

    #[test]
    fn test_case_insensitive_counts() {
        let redactor = redactor("confidential\n", MatchMode::Word);
        let (redacted, info) =
            redactor.redact("CONFIDENTIAL: this is Confidential and confidential.");

        assert_eq!(redacted, "[REDACTED]: this is [REDACTED] and [REDACTED].");
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].redaction_type, "confidential");
        assert_eq!(info[0].count, 3);
    }

    #[test]
    fn test_word_mode_respects_boundaries() {
        let redactor = redactor("ann\nC++\n", MatchMode::Word);
        let (redacted, info) = redactor.redact("Ann wrote to Joanne about annual C++ plans (ann_x).");

        assert_eq!(
            redacted,
            "[REDACTED] wrote to Joanne about annual [REDACTED] plans (ann_x)."
        );
        assert_eq!(info.len(), 2);
    }

    #[test]
    fn test_substring_mode() {
        let redactor = redactor("ann", MatchMode::Substring);
        let (redacted, info) = redactor.redact("Joanne, annual");

        assert_eq!(redacted, "Jo[REDACTED]e, [REDACTED]ual");
        assert_eq!(info[0].count, 2);
    }

    #[test]
    fn test_phrase_beats_contained_word_and_spans_lines() {
        let redactor = redactor("Jane\nJane Doe\n", MatchMode::Word);
        let (redacted, info) = redactor.redact("Jane  Doe said Jane\nDoe and Jane agreed");

        assert_eq!(redacted, "[REDACTED] said [REDACTED] and [REDACTED] agreed");
        // Reported in list order
        assert_eq!(info[0].redaction_type, "Jane");
        assert_eq!(info[0].count, 1);
        assert_eq!(info[1].redaction_type, "Jane Doe");
        assert_eq!(info[1].count, 2);
    }

    #[test]
    fn test_marker_never_rematched() {
        let redactor = redactor("redacted\nRED\n[REDACTED]\n", MatchMode::Substring);
        let text = "keep [REDACTED] but drop red and redacted";
        let (redacted, _) = redactor.redact(text);

        assert_eq!(redacted, "keep [REDACTED] but drop [REDACTED] and [REDACTED]");

        let (again, info) = redactor.redact(&redacted);
        assert_eq!(again, redacted);
        assert!(info.is_empty());
    }

    #[test]
    fn test_growing_list() {
        let text = "alpha beta gamma ALPHA";
        let (first, info) = redactor("alpha", MatchMode::Word).redact(text);
        assert_eq!(first, "[REDACTED] beta gamma [REDACTED]");
        assert_eq!(info[0].count, 2);

        let (second, info) = redactor("alpha\nbeta\n", MatchMode::Word).redact(&first);
        assert_eq!(second, "[REDACTED] [REDACTED] gamma [REDACTED]");
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].redaction_type, "beta");
        assert_eq!(info[0].count, 1);
    }

    #[test]
    fn test_word_list_parse_dedups() {
        let list = WordList::parse("\u{feff}Alpha\n\n  alpha \nJane   Doe\njane doe\r\nbeta\n");
        assert_eq!(list.terms(), &["Alpha", "Jane   Doe", "beta"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_duplicate_terms_report_once() {
        let redactor = redactor("secret\nSECRET\nSecret\n", MatchMode::Word);
        let (_, info) = redactor.redact("secret Secret");
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].count, 2);
    }

    #[test]
    fn test_missing_word_list_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let list = WordList::load(&dir.path().join("redact_words.txt"));
        assert!(list.is_empty());

        let redactor = WordRedactor::new(&list, MatchMode::Word, RedactionMarker::default()).unwrap();
        assert!(redactor.is_empty());
        let (text, info) = redactor.redact("nothing to see");
        assert_eq!(text, "nothing to see");
        assert!(info.is_empty());
    }

    #[test]
    fn test_match_mode_parse() {
        assert_eq!("word".parse::<MatchMode>().unwrap(), MatchMode::Word);
        assert_eq!("SUBSTRING".parse::<MatchMode>().unwrap(), MatchMode::Substring);
        assert!("fuzzy".parse::<MatchMode>().is_err());
        assert_eq!(serde_json::to_string(&MatchMode::Substring).unwrap(), "\"substring\"");
    }
}
