use glob::{MatchOptions, Pattern};
use tracing::warn;

/// Metadata files the extraction tool writes next to every message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFile {
    ConversationIndex,
    Recipients,
}

impl MetadataFile {
    pub const ALL: [MetadataFile; 2] = [MetadataFile::ConversationIndex, MetadataFile::Recipients];

    pub fn file_name(self) -> &'static str {
        match self {
            MetadataFile::ConversationIndex => "conversationindex.txt",
            MetadataFile::Recipients => "recipients.txt",
        }
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Case-insensitive file-name denylist using glob patterns
pub struct Denylist {
    patterns: Vec<Pattern>,
}

impl Denylist {
    /// Create new denylist from pattern strings
    pub fn new(patterns: Vec<String>) -> Self {
        let compiled: Vec<Pattern> = patterns
            .into_iter()
            .filter_map(|p| match Pattern::new(&p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid metadata pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        Self { patterns: compiled }
    }

    /// Built-in metadata names plus any extra patterns
    pub fn metadata(extra: &[String]) -> Self {
        let mut patterns: Vec<String> = MetadataFile::ALL
            .iter()
            .map(|m| Pattern::escape(m.file_name()))
            .collect();
        patterns.extend(extra.iter().cloned());
        Self::new(patterns)
    }

    /// Check if a file name matches any deny pattern
    pub fn is_denied(&self, file_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(file_name, MATCH_OPTIONS))
    }

    /// Get first matching pattern (for log messages)
    pub fn matching_pattern(&self, file_name: &str) -> Option<String> {
        self.patterns
            .iter()
            .find(|p| p.matches_with(file_name, MATCH_OPTIONS))
            .map(|p| p.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_metadata_case_insensitive() {
        let denylist = Denylist::metadata(&[]);

        assert!(denylist.is_denied("ConversationIndex.txt"));
        assert!(denylist.is_denied("conversationindex.txt"));
        assert!(denylist.is_denied("RECIPIENTS.TXT"));
        assert!(!denylist.is_denied("Message.txt"));
        assert!(!denylist.is_denied("recipients.txt.bak"));
    }

    #[test]
    fn test_extra_patterns() {
        let denylist = Denylist::metadata(&["*.msg-meta".to_string(), "Thumbs.db".to_string()]);

        assert!(denylist.is_denied("0001.MSG-META"));
        assert!(denylist.is_denied("thumbs.db"));
        assert!(!denylist.is_denied("OutlookHeaders.txt"));
    }

    #[test]
    fn test_matching_pattern() {
        let denylist = Denylist::metadata(&[]);

        let pattern = denylist.matching_pattern("Recipients.txt");
        assert_eq!(pattern, Some("recipients.txt".to_string()));

        let no_match = denylist.matching_pattern("README.md");
        assert_eq!(no_match, None);
    }
}
