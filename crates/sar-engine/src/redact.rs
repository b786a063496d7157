//! Shared per-file walk for the two redaction stages

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sar_core::{FileIssue, FileRedactions, RedactionInfo, Result, StageKind, StageReport};
use sar_sources::ExportTree;
use sar_sources::file::{read_text, write_atomic};
use tracing::{debug, info};

use crate::StageOptions;

enum Outcome {
    Unchanged,
    Redacted(FileRedactions),
    Failed(FileIssue),
}

/// Apply `redact` to every text file, in parallel, writing back only files
/// that changed. A file that fails is reported and left as it was.
pub(crate) fn redact_text_files<F>(
    tree: &ExportTree,
    stage: StageKind,
    options: &StageOptions,
    redact: F,
) -> Result<StageReport>
where
    F: Fn(&str) -> (String, Vec<RedactionInfo>) + Sync,
{
    let mut report = StageReport::new(stage, options.dry_run);
    let (files, walk_issues) = tree.text_files();
    report.files_scanned = files.len();
    report.issues.extend(walk_issues);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .map_err(anyhow::Error::from)?;

    let outcomes: Vec<Outcome> = pool.install(|| {
        files
            .par_iter()
            .map(|path| redact_file(tree, path, options.dry_run, &redact))
            .collect()
    });

    for outcome in outcomes {
        match outcome {
            Outcome::Unchanged => {}
            Outcome::Redacted(hits) => report.redactions.push(hits),
            Outcome::Failed(issue) => report.issues.push(issue),
        }
    }

    report.sort();
    Ok(report)
}

fn redact_file<F>(tree: &ExportTree, path: &Path, dry_run: bool, redact: &F) -> Outcome
where
    F: Fn(&str) -> (String, Vec<RedactionInfo>),
{
    let relative: PathBuf = tree.relative(path);

    let file = match read_text(path) {
        Ok(file) => file,
        Err(e) => return Outcome::Failed(FileIssue::new(relative, e)),
    };

    let (redacted, hits) = redact(&file.content);
    if hits.is_empty() || redacted == file.content {
        debug!("{} unchanged", relative.display());
        return Outcome::Unchanged;
    }
    if file.lossy {
        debug!("{} is not valid UTF-8; invalid bytes replaced", relative.display());
    }

    if !dry_run && let Err(e) = write_atomic(path, redacted.as_bytes()) {
        return Outcome::Failed(FileIssue::new(relative, e));
    }

    let redactions = FileRedactions {
        path: relative,
        redactions: hits,
    };
    info!(
        "Redacted {} ({} replacements)",
        redactions.path.display(),
        redactions.total()
    );
    Outcome::Redacted(redactions)
}
