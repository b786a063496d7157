use std::path::PathBuf;

use anyhow::Result;
use sar_config::Config;
use sar_engine::{HeaderStage, run_stage};

use super::{marker, open_tree, print_issues, print_redactions, print_summary, stage_options};
use crate::cli::CommonArgs;

pub fn handle(
    config: &Config,
    root: PathBuf,
    marker_flag: Option<String>,
    jobs: Option<usize>,
    common: CommonArgs,
) -> Result<()> {
    let tree = open_tree(config, &root)?;
    let stage = HeaderStage::new(marker(config, marker_flag)?)?;
    let options = stage_options(config, common.dry_run, common.require_previous, jobs);

    let report = run_stage(&stage, &tree, &options)?;

    print_redactions(&report);
    print_summary(&report);
    print_issues(&report);
    Ok(())
}
