pub mod headers;
pub mod normalize;
pub mod run;
pub mod status;
pub mod words;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sar_config::Config;
use sar_core::{RedactionMarker, StageReport, TreeChange};
use sar_engine::StageOptions;
use sar_security::{MatchMode, WordList};
use sar_sources::{ExportTree, TreeLayout};

use crate::cli::WordArgs;

pub fn open_tree(config: &Config, root: &Path) -> Result<ExportTree> {
    let layout = TreeLayout {
        attachments_dir: config.attachments_dir.clone(),
        state_dir: config.state_dir.clone(),
    };
    ExportTree::open(root, layout)
        .with_context(|| format!("Cannot open export tree {}", root.display()))
}

/// `--marker` if given, otherwise the configured marker
pub fn marker(config: &Config, flag: Option<String>) -> Result<RedactionMarker> {
    match flag {
        Some(text) => Ok(RedactionMarker::new(text)?),
        None => Ok(config.marker.clone()),
    }
}

pub fn stage_options(
    config: &Config,
    dry_run: bool,
    require_previous: bool,
    jobs: Option<usize>,
) -> StageOptions {
    StageOptions {
        dry_run,
        require_previous,
        jobs: jobs.unwrap_or(config.jobs),
    }
}

/// The word list and match mode after applying flags over config
pub fn word_list(config: &Config, args: WordArgs) -> (PathBuf, WordList, MatchMode) {
    let path = args.list.unwrap_or_else(|| config.words.list.clone());
    let list = WordList::load(&path);
    let mode = args.match_mode.unwrap_or(config.words.match_mode);
    (path, list, mode)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per changed tree entry
pub fn print_changes(report: &StageReport) {
    let prefix = if report.dry_run { "would " } else { "" };
    for change in &report.changes {
        match change {
            TreeChange::DeletedMetadata { path } => {
                println!("  {}delete metadata   {}", prefix, path.display())
            }
            TreeChange::DeletedAttachment { path } => {
                println!("  {}delete attachment {}", prefix, path.display())
            }
            TreeChange::MovedAttachment { from, to } => {
                println!("  {}move              {} -> {}", prefix, from.display(), to.display())
            }
            TreeChange::ConvertedBody { from, to } => {
                println!("  {}convert           {} -> {}", prefix, from.display(), to.display())
            }
            TreeChange::PrunedFolder { path } => {
                println!("  {}remove folder     {}", prefix, path.display())
            }
        }
    }
}

/// `<path>: type ×count, type ×count` per file, then a total
pub fn print_redactions(report: &StageReport) {
    for file in &report.redactions {
        let hits: Vec<String> = file
            .redactions
            .iter()
            .map(|r| format!("{} ×{}", r.redaction_type, r.count))
            .collect();
        println!("{}: {}", file.path.display(), hits.join(", "));
    }
}

pub fn print_summary(report: &StageReport) {
    let verb = if report.dry_run { "would change" } else { "changed" };
    let mut line = format!(
        "✓ {}: {} files scanned, {} {}",
        report.stage,
        report.files_scanned,
        verb,
        report.files_changed()
    );
    if !report.redactions.is_empty() {
        line.push_str(&format!(", {} redactions", report.total_redactions()));
    }
    if report.has_issues() {
        line.push_str(&format!(", {} warnings", report.issues.len()));
    }
    println!("{}", line);
}

pub fn print_issues(report: &StageReport) {
    if !report.has_issues() {
        return;
    }
    println!("\nSkipped (left unchanged, fix and re-run):");
    for issue in &report.issues {
        println!("  {}: {}", issue.path.display(), issue.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();

        let options = stage_options(&config, true, false, Some(2));
        assert!(options.dry_run);
        assert_eq!(options.jobs, 2);
        assert_eq!(stage_options(&config, false, false, None).jobs, config.jobs);

        assert_eq!(marker(&config, None).unwrap().as_str(), "[REDACTED]");
        assert_eq!(marker(&config, Some("<x>".into())).unwrap().as_str(), "<x>");
        assert!(marker(&config, Some("a@b.cd".into())).is_err());
    }

    #[test]
    fn test_word_list_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let list_path = dir.path().join("terms.txt");
        std::fs::write(&list_path, "alpha\nbeta\n").unwrap();

        let args = WordArgs {
            list: Some(list_path.clone()),
            match_mode: None,
        };
        let (path, list, mode) = word_list(&Config::default(), args);
        assert_eq!(path, list_path);
        assert_eq!(list.len(), 2);
        assert_eq!(mode, MatchMode::Word);
    }
}
