//! Run reports
//!
//! Every stage returns a [`StageReport`]. Per-file failures are recorded as
//! [`FileIssue`] values rather than errors so that one bad file never aborts
//! the walk. Paths in a report are relative to the tree root.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::StageKind;

/// One kind of redaction applied to a file, with how often it hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionInfo {
    pub redaction_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRedactions {
    pub path: PathBuf,
    pub redactions: Vec<RedactionInfo>,
}

impl FileRedactions {
    pub fn total(&self) -> usize {
        self.redactions.iter().map(|r| r.count).sum()
    }

    pub fn count_for(&self, redaction_type: &str) -> usize {
        self.redactions
            .iter()
            .filter(|r| r.redaction_type == redaction_type)
            .map(|r| r.count)
            .sum()
    }
}

/// Structural change made to the tree by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TreeChange {
    DeletedMetadata { path: PathBuf },
    DeletedAttachment { path: PathBuf },
    MovedAttachment { from: PathBuf, to: PathBuf },
    ConvertedBody { from: PathBuf, to: PathBuf },
    PrunedFolder { path: PathBuf },
}

impl TreeChange {
    pub fn path(&self) -> &PathBuf {
        match self {
            TreeChange::DeletedMetadata { path }
            | TreeChange::DeletedAttachment { path }
            | TreeChange::PrunedFolder { path } => path,
            TreeChange::MovedAttachment { from, .. } | TreeChange::ConvertedBody { from, .. } => {
                from
            }
        }
    }
}

/// A file the stage could not process; it was left in its pre-stage state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIssue {
    pub path: PathBuf,
    pub message: String,
}

impl FileIssue {
    pub fn new(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: StageKind,
    pub dry_run: bool,
    pub files_scanned: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<TreeChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redactions: Vec<FileRedactions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FileIssue>,
}

impl StageReport {
    pub fn new(stage: StageKind, dry_run: bool) -> Self {
        Self {
            stage,
            dry_run,
            files_scanned: 0,
            changes: Vec::new(),
            redactions: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn files_changed(&self) -> usize {
        self.changes.len() + self.redactions.len()
    }

    pub fn total_redactions(&self) -> usize {
        self.redactions.iter().map(FileRedactions::total).sum()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Sort every list by path so output does not depend on walk order
    pub fn sort(&mut self) {
        self.redactions.sort_by(|a, b| a.path.cmp(&b.path));
        self.issues.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn redactions_for(&self, path: &std::path::Path) -> Option<&FileRedactions> {
        self.redactions.iter().find(|r| r.path == path)
    }
}
