use std::path::PathBuf;

use anyhow::Result;
use sar_config::Config;
use sar_core::StageReport;
use sar_engine::{WordStage, run_stage};
use tracing::info;

use super::{
    marker, open_tree, print_issues, print_json, print_redactions, print_summary, stage_options,
    word_list,
};
use crate::cli::{CommonArgs, WordArgs};

pub fn handle(
    config: &Config,
    root: PathBuf,
    words: WordArgs,
    marker_flag: Option<String>,
    jobs: Option<usize>,
    json: bool,
    common: CommonArgs,
) -> Result<()> {
    let tree = open_tree(config, &root)?;
    let (path, list, mode) = word_list(config, words);
    info!("Loaded {} terms from {} ({} mode)", list.len(), path.display(), mode);

    let stage = WordStage::new(&list, mode, marker(config, marker_flag)?)?;
    let options = stage_options(config, common.dry_run, common.require_previous, jobs);

    let report = run_stage(&stage, &tree, &options)?;

    if json {
        return print_json(&report);
    }
    if list.is_empty() {
        println!("No words loaded, nothing to redact.");
        return Ok(());
    }
    print_word_report(&report);
    Ok(())
}

pub fn print_word_report(report: &StageReport) {
    if report.redactions.is_empty() {
        println!("No matches for the word list.");
    } else {
        print_redactions(report);
        println!();
    }
    print_summary(report);
    print_issues(report);
}
