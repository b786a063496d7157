//! The three stages of the release pipeline and the runner that chains them.
//!
//! Each stage consumes the filesystem state left by the previous one and
//! records a sentinel in the tree's state directory once its walk is done.

pub mod headers;
pub mod normalize;
pub mod pipeline;
mod redact;
pub mod sentinel;
pub mod words;

use sar_core::{Result, StageKind, StageReport};
use sar_sources::ExportTree;
use tracing::{info, warn};

pub use headers::HeaderStage;
pub use normalize::Normalizer;
pub use pipeline::Pipeline;
pub use words::WordStage;

/// Options shared by every stage
#[derive(Debug, Clone, Default)]
pub struct StageOptions {
    /// Report what would change without touching the tree
    pub dry_run: bool,
    /// Refuse to run unless the previous stage's sentinel exists
    pub require_previous: bool,
    /// Worker threads for per-file work (0 = one per core)
    pub jobs: usize,
}

pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    /// Walk the tree once; per-file failures go into the report
    fn execute(&self, tree: &ExportTree, options: &StageOptions) -> Result<StageReport>;
}

/// Run one stage on its own, checking that its predecessor completed
pub fn run_stage(stage: &dyn Stage, tree: &ExportTree, options: &StageOptions) -> Result<StageReport> {
    sentinel::check_previous(tree, stage.kind(), options.require_previous)?;
    execute_and_record(stage, tree, options)
}

pub(crate) fn execute_and_record(
    stage: &dyn Stage,
    tree: &ExportTree,
    options: &StageOptions,
) -> Result<StageReport> {
    let kind = stage.kind();
    info!(
        "Running stage '{}' on {}{}",
        kind,
        tree.root().display(),
        if options.dry_run { " (dry run)" } else { "" }
    );

    let mut report = stage.execute(tree, options)?;

    if !options.dry_run {
        sentinel::record(tree, &mut report);
    }

    for issue in &report.issues {
        warn!("{}: {}", issue.path.display(), issue.message);
    }
    info!(
        "Stage '{}' complete: {} files scanned, {} changed, {} warnings",
        kind,
        report.files_scanned,
        report.files_changed(),
        report.issues.len()
    );

    Ok(report)
}
