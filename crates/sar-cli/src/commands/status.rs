use std::path::PathBuf;

use anyhow::Result;
use sar_config::Config;
use sar_core::StageKind;
use sar_engine::sentinel;

use super::open_tree;

pub fn handle(config: &Config, root: PathBuf) -> Result<()> {
    let tree = open_tree(config, &root)?;

    println!("Export: {}", tree.root().display());
    for stage in StageKind::ALL {
        match sentinel::read(&tree, stage) {
            Some(done) => println!(
                "  {:<10} done    (sar {}, {} files changed, {} warnings)",
                stage.name(),
                done.version,
                done.files_changed,
                done.warnings
            ),
            None => println!("  {:<10} pending", stage.name()),
        }
    }
    Ok(())
}
