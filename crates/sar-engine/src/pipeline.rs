//! All three stages in order

use sar_core::{Result, StageReport};
use sar_sources::ExportTree;

use crate::{HeaderStage, Normalizer, Stage, StageOptions, WordStage, execute_and_record};

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(normalizer: Normalizer, headers: HeaderStage, words: WordStage) -> Self {
        Self {
            stages: vec![Box::new(normalizer), Box::new(headers), Box::new(words)],
        }
    }

    /// Run every stage; a fatal error stops before the next stage starts
    pub fn run(&self, tree: &ExportTree, options: &StageOptions) -> Result<Vec<StageReport>> {
        let mut reports = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            reports.push(execute_and_record(stage.as_ref(), tree, options)?);
        }
        Ok(reports)
    }
}
