use std::path::PathBuf;

use anyhow::Result;
use sar_config::Config;
use sar_engine::{Normalizer, run_stage};
use sar_sources::{Denylist, SubjectMatcher};

use super::{open_tree, print_changes, print_issues, print_summary, stage_options};
use crate::cli::CommonArgs;

pub fn normalizer(config: &Config, subjects: &[String]) -> Result<Normalizer> {
    let matcher = SubjectMatcher::new(subjects)?;
    let denylist = Denylist::metadata(&config.normalize.extra_metadata);
    Ok(Normalizer::new(matcher, denylist))
}

pub fn handle(config: &Config, root: PathBuf, subjects: Vec<String>, common: CommonArgs) -> Result<()> {
    let tree = open_tree(config, &root)?;
    let stage = normalizer(config, &subjects)?;
    let options = stage_options(config, common.dry_run, common.require_previous, None);

    let report = run_stage(&stage, &tree, &options)?;

    print_changes(&report);
    print_summary(&report);
    print_issues(&report);
    Ok(())
}
