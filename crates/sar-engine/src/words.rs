use sar_core::{RedactionMarker, Result, StageKind, StageReport};
use sar_security::{MatchMode, WordList, WordRedactor};
use sar_sources::ExportTree;
use tracing::info;

use crate::redact::redact_text_files;
use crate::{Stage, StageOptions};

/// Applies the operator's word list to every text file
pub struct WordStage {
    redactor: WordRedactor,
}

impl WordStage {
    pub fn new(list: &WordList, mode: MatchMode, marker: RedactionMarker) -> Result<Self> {
        Ok(Self {
            redactor: WordRedactor::new(list, mode, marker)?,
        })
    }
}

impl Stage for WordStage {
    fn kind(&self) -> StageKind {
        StageKind::Words
    }

    fn execute(&self, tree: &ExportTree, options: &StageOptions) -> Result<StageReport> {
        if self.redactor.is_empty() {
            info!("No words loaded, nothing to redact.");
            return Ok(StageReport::new(StageKind::Words, options.dry_run));
        }

        redact_text_files(tree, StageKind::Words, options, |content| {
            self.redactor.redact(content)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sar_sources::TreeLayout;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn stage(terms: &str) -> WordStage {
        WordStage::new(
            &WordList::parse(terms),
            MatchMode::Word,
            RedactionMarker::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_reports_per_file_hits() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("m")).unwrap();
        fs::write(dir.path().join("m/Message.txt"), "Project Falcon, falcon, FALCON").unwrap();
        fs::write(dir.path().join("m/Other.txt"), "nothing here").unwrap();
        let tree = ExportTree::open(dir.path(), TreeLayout::default()).unwrap();

        let report = stage("falcon\n").execute(&tree, &StageOptions::default()).unwrap();

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.redactions.len(), 1);
        let hits = report.redactions_for(Path::new("m/Message.txt")).unwrap();
        assert_eq!(hits.count_for("falcon"), 3);
    }

    #[test]
    fn test_empty_list_changes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "secret").unwrap();
        let tree = ExportTree::open(dir.path(), TreeLayout::default()).unwrap();

        let report = stage("\n\n").execute(&tree, &StageOptions::default()).unwrap();

        assert_eq!(report.files_scanned, 0);
        assert!(report.redactions.is_empty());
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "secret");
    }

    #[test]
    fn test_non_utf8_rewritten_only_when_redacted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hit.txt"), b"caf\xe9 secret").unwrap();
        fs::write(dir.path().join("miss.txt"), b"caf\xe9 only").unwrap();
        let tree = ExportTree::open(dir.path(), TreeLayout::default()).unwrap();

        let report = stage("secret").execute(&tree, &StageOptions::default()).unwrap();

        assert_eq!(report.redactions.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("hit.txt")).unwrap(),
            "caf\u{fffd} [REDACTED]"
        );
        assert_eq!(fs::read(dir.path().join("miss.txt")).unwrap(), b"caf\xe9 only");
    }
}
