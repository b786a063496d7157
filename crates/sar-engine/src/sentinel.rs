//! Stage completion sentinels
//!
//! A sentinel is the "stage complete" signal for calling tooling: a small
//! JSON file per stage in the tree's state directory. Any stage that changes
//! files invalidates the sentinels of the stages after it.

use std::fs;
use std::path::PathBuf;

use sar_core::{Error, FileIssue, Result, StageKind, StageReport, StageSentinel};
use sar_sources::ExportTree;
use sar_sources::file::write_atomic;
use tracing::{debug, warn};

pub fn sentinel_path(tree: &ExportTree, stage: StageKind) -> PathBuf {
    tree.state_path().join(stage.sentinel_file_name())
}

/// Read a stage's sentinel; missing or unreadable means "not completed"
pub fn read(tree: &ExportTree, stage: StageKind) -> Option<StageSentinel> {
    let path = sentinel_path(tree, stage);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(sentinel) => Some(sentinel),
        Err(e) => {
            warn!("Ignoring corrupt sentinel {}: {}", path.display(), e);
            None
        }
    }
}

/// Sentinels of every completed stage, in pipeline order
pub fn completed(tree: &ExportTree) -> Vec<StageSentinel> {
    StageKind::ALL
        .iter()
        .filter_map(|stage| read(tree, *stage))
        .collect()
}

pub fn check_previous(tree: &ExportTree, stage: StageKind, require: bool) -> Result<()> {
    let Some(previous) = stage.previous() else {
        return Ok(());
    };
    if read(tree, previous).is_some() {
        return Ok(());
    }

    if require {
        return Err(Error::PreviousStageMissing {
            stage: stage.name(),
            previous: previous.name(),
        });
    }
    warn!(
        "Stage '{}' has not completed on this tree; running '{}' anyway",
        previous, stage
    );
    Ok(())
}

/// Write the sentinel for a finished walk; failures become report issues
pub(crate) fn record(tree: &ExportTree, report: &mut StageReport) {
    let sentinel = StageSentinel {
        stage: report.stage,
        version: env!("CARGO_PKG_VERSION").to_string(),
        files_changed: report.files_changed(),
        warnings: report.issues.len(),
    };
    let path = sentinel_path(tree, report.stage);

    let written = fs::create_dir_all(tree.state_path())
        .map_err(Error::from)
        .and_then(|_| Ok(serde_json::to_vec_pretty(&sentinel)?))
        .and_then(|bytes| Ok(write_atomic(&path, &bytes)?));
    if let Err(e) = written {
        report.issues.push(FileIssue::new(tree.relative(&path), e));
        return;
    }
    debug!("Wrote sentinel {}", path.display());

    if sentinel.files_changed == 0 {
        return;
    }
    for later in StageKind::ALL.iter().filter(|s| **s > report.stage) {
        let stale = sentinel_path(tree, *later);
        if stale.exists() {
            match fs::remove_file(&stale) {
                Ok(()) => debug!("Invalidated sentinel {}", stale.display()),
                Err(e) => report.issues.push(FileIssue::new(tree.relative(&stale), e)),
            }
        }
    }
}
