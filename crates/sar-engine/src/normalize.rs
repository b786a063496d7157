//! Export normalization
//!
//! One sorted, sequential walk over the tree: metadata is deleted,
//! attachments are moved to the flat attachments directory or deleted, HTML
//! bodies become plain text, and folders emptied along the way are pruned.
//! Relocation order decides collision suffixes, which is why this stage is
//! never parallel.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use sar_core::{FileIssue, Result, StageKind, StageReport, TreeChange};
use sar_sources::attachment::{relocate, unique_destination_with};
use sar_sources::file::write_atomic;
use sar_sources::{Denylist, EntryKind, ExportTree, HtmlTextExtractor, SubjectMatcher, TextExtractor};
use tracing::{debug, info};

use crate::{Stage, StageOptions};

pub struct Normalizer {
    matcher: SubjectMatcher,
    denylist: Denylist,
    extractor: Box<dyn TextExtractor>,
}

/// Mutable state of one walk
struct Walk<'a> {
    tree: &'a ExportTree,
    dry_run: bool,
    report: StageReport,
    /// Files deleted or moved away, for pruning
    removed: HashSet<PathBuf>,
    /// Paths a dry run would have created
    planned: HashSet<PathBuf>,
}

impl Walk<'_> {
    fn taken(&self, path: &Path) -> bool {
        path.exists() || self.planned.contains(path)
    }

    fn issue(&mut self, path: &Path, message: impl ToString) {
        self.report
            .issues
            .push(FileIssue::new(self.tree.relative(path), message));
    }
}

impl Normalizer {
    pub fn new(matcher: SubjectMatcher, denylist: Denylist) -> Self {
        Self {
            matcher,
            denylist,
            extractor: Box::new(HtmlTextExtractor),
        }
    }

    /// Swap the HTML extraction strategy
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    fn delete_metadata(&self, walk: &mut Walk<'_>, path: &Path) {
        if let Some(pattern) = self.denylist.matching_pattern(&file_name(path)) {
            debug!("{} matches metadata pattern '{}'", path.display(), pattern);
        }
        if !walk.dry_run && let Err(e) = fs::remove_file(path) {
            walk.issue(path, e);
            return;
        }

        info!("Deleted metadata {}", walk.tree.relative(path).display());
        walk.removed.insert(path.to_path_buf());
        walk.report.changes.push(TreeChange::DeletedMetadata {
            path: walk.tree.relative(path),
        });
    }

    fn handle_attachment(&self, walk: &mut Walk<'_>, path: &Path) {
        let tree = walk.tree;
        let name = file_name(path);

        let Some(token) = self.matcher.matching_token(&name) else {
            if !walk.dry_run && let Err(e) = fs::remove_file(path) {
                walk.issue(path, e);
                return;
            }
            info!("Deleted irrelevant attachment {}", tree.relative(path).display());
            walk.removed.insert(path.to_path_buf());
            walk.report.changes.push(TreeChange::DeletedAttachment {
                path: tree.relative(path),
            });
            return;
        };

        let attachments = tree.attachments_path();
        let dest = if walk.dry_run {
            let dest = unique_destination_with(&attachments, &name, |p| walk.taken(p));
            walk.planned.insert(dest.clone());
            dest
        } else {
            match relocate(path, &attachments) {
                Ok(dest) => dest,
                Err(e) => {
                    walk.issue(path, format!("cannot relocate attachment: {}", e));
                    return;
                }
            }
        };

        info!(
            "Relocated {} (matches '{}') to {}",
            tree.relative(path).display(),
            token,
            tree.relative(&dest).display()
        );
        walk.removed.insert(path.to_path_buf());
        walk.report.changes.push(TreeChange::MovedAttachment {
            from: tree.relative(path),
            to: tree.relative(&dest),
        });
    }

    fn convert_body(&self, walk: &mut Walk<'_>, path: &Path) {
        let tree = walk.tree;
        let html = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return walk.issue(path, e),
        };
        let text = match self.extractor.extract(&html) {
            Ok(text) => text,
            Err(e) => return walk.issue(path, e),
        };

        let dir = path.parent().unwrap_or(tree.root());
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dest = unique_destination_with(dir, &format!("{}.txt", stem), |p| walk.taken(p));

        if walk.dry_run {
            walk.planned.insert(dest.clone());
        } else {
            if let Err(e) = write_atomic(&dest, text.as_bytes()) {
                return walk.issue(path, format!("cannot write {}: {}", dest.display(), e));
            }
            if let Err(e) = fs::remove_file(path) {
                return walk.issue(path, e);
            }
        }

        info!(
            "Converted {} to {}",
            tree.relative(path).display(),
            tree.relative(&dest).display()
        );
        walk.report.changes.push(TreeChange::ConvertedBody {
            from: tree.relative(path),
            to: tree.relative(&dest),
        });
    }
}

impl Stage for Normalizer {
    fn kind(&self) -> StageKind {
        StageKind::Normalize
    }

    fn execute(&self, tree: &ExportTree, options: &StageOptions) -> Result<StageReport> {
        let (files, walk_issues) = tree.files();

        let mut walk = Walk {
            tree,
            dry_run: options.dry_run,
            report: StageReport::new(StageKind::Normalize, options.dry_run),
            removed: HashSet::new(),
            planned: HashSet::new(),
        };
        walk.report.files_scanned = files.len();
        walk.report.issues.extend(walk_issues);

        for path in &files {
            match tree.classify(path, &self.denylist) {
                EntryKind::State | EntryKind::RelocatedAttachment | EntryKind::MessageText => {}
                EntryKind::Metadata => self.delete_metadata(&mut walk, path),
                EntryKind::Attachment => self.handle_attachment(&mut walk, path),
                EntryKind::HtmlBody => self.convert_body(&mut walk, path),
            }
        }

        let (pruned, prune_issues) = tree.prune_empty_dirs(&walk.removed, options.dry_run);
        walk.report.changes.extend(
            pruned
                .into_iter()
                .map(|path| TreeChange::PrunedFolder { path }),
        );
        walk.report.issues.extend(prune_issues);

        let mut report = walk.report;
        report.sort();
        Ok(report)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
