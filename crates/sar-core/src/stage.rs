//! Pipeline stage identities

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three stages, in the only order they may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Normalize,
    Headers,
    Words,
}

impl StageKind {
    pub const ALL: [StageKind; 3] = [StageKind::Normalize, StageKind::Headers, StageKind::Words];

    pub fn name(self) -> &'static str {
        match self {
            StageKind::Normalize => "normalize",
            StageKind::Headers => "headers",
            StageKind::Words => "words",
        }
    }

    /// Stage that must have completed before this one
    pub fn previous(self) -> Option<StageKind> {
        match self {
            StageKind::Normalize => None,
            StageKind::Headers => Some(StageKind::Normalize),
            StageKind::Words => Some(StageKind::Headers),
        }
    }

    pub fn sentinel_file_name(self) -> String {
        format!("{}.done", self.name())
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Completion record left in the state directory after a stage's walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSentinel {
    pub stage: StageKind,
    pub version: String,
    pub files_changed: usize,
    pub warnings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(StageKind::Normalize.previous(), None);
        assert_eq!(StageKind::Headers.previous(), Some(StageKind::Normalize));
        assert_eq!(StageKind::Words.previous(), Some(StageKind::Headers));
        assert!(StageKind::Normalize < StageKind::Words);
    }

    #[test]
    fn test_sentinel_serialization() {
        let sentinel = StageSentinel {
            stage: StageKind::Headers,
            version: "0.2.0".to_string(),
            files_changed: 4,
            warnings: 1,
        };

        let json = serde_json::to_string(&sentinel).unwrap();
        assert!(json.contains("\"stage\":\"headers\""));

        let parsed: StageSentinel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sentinel);
        assert_eq!(StageKind::Headers.sentinel_file_name(), "headers.done");
    }
}
