use std::path::PathBuf;

use anyhow::Result;
use sar_config::Config;
use sar_core::{StageKind, StageReport, TreeChange};
use sar_engine::{HeaderStage, Pipeline, WordStage};
use tracing::{info, warn};

use super::normalize::normalizer;
use super::words::print_word_report;
use super::{
    open_tree, print_changes, print_issues, print_json, print_redactions, print_summary,
    stage_options, word_list,
};
use crate::cli::WordArgs;

pub fn handle(
    config: &Config,
    root: PathBuf,
    subjects: Vec<String>,
    words: WordArgs,
    json: bool,
    dry_run: bool,
) -> Result<()> {
    let tree = open_tree(config, &root)?;
    let (path, list, mode) = word_list(config, words);
    info!("Loaded {} terms from {} ({} mode)", list.len(), path.display(), mode);

    let pipeline = Pipeline::new(
        normalizer(config, &subjects)?,
        HeaderStage::new(config.marker.clone())?,
        WordStage::new(&list, mode, config.marker.clone())?,
    );
    let options = stage_options(config, dry_run, false, None);

    let reports = pipeline.run(&tree, &options)?;

    let note = dry_run_note(&reports);
    if json {
        if let Some(note) = &note {
            warn!("{}", note);
        }
        return print_json(&reports);
    }
    for report in &reports {
        match report.stage {
            StageKind::Normalize => {
                print_changes(report);
                print_summary(report);
                print_issues(report);
            }
            StageKind::Headers => {
                print_redactions(report);
                print_summary(report);
                print_issues(report);
            }
            StageKind::Words if list.is_empty() => {
                println!("No words loaded, nothing to redact.");
            }
            StageKind::Words => print_word_report(report),
        }
        println!();
    }
    if let Some(note) = note {
        println!("Note: {}", note);
    }
    Ok(())
}

/// Redaction counts of a dry run miss bodies the normalizer only planned to
/// convert
fn dry_run_note(reports: &[StageReport]) -> Option<String> {
    let normalize = reports.iter().find(|r| r.stage == StageKind::Normalize)?;
    if !normalize.dry_run {
        return None;
    }
    let pending = normalize
        .changes
        .iter()
        .filter(|c| matches!(c, TreeChange::ConvertedBody { .. }))
        .count();
    if pending == 0 {
        return None;
    }
    Some(format!(
        "{} HTML bodies are not converted in a dry run; header and word counts exclude them",
        pending
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_report(dry_run: bool, converted: usize) -> StageReport {
        let mut report = StageReport::new(StageKind::Normalize, dry_run);
        for i in 0..converted {
            report.changes.push(TreeChange::ConvertedBody {
                from: PathBuf::from(format!("m{}/Message.html", i)),
                to: PathBuf::from(format!("m{}/Message.txt", i)),
            });
        }
        report
    }

    #[test]
    fn test_dry_run_note_counts_pending_conversions() {
        let reports = vec![
            normalize_report(true, 2),
            StageReport::new(StageKind::Headers, true),
        ];
        let note = dry_run_note(&reports).unwrap();
        assert!(note.starts_with("2 HTML bodies are not converted"));
    }

    #[test]
    fn test_no_note_without_pending_conversions() {
        assert!(dry_run_note(&[normalize_report(true, 0)]).is_none());
        assert!(dry_run_note(&[normalize_report(false, 3)]).is_none());
        assert!(dry_run_note(&[]).is_none());
    }
}
