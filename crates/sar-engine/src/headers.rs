use sar_core::{RedactionMarker, Result, StageKind, StageReport};
use sar_security::HeaderRedactor;
use sar_sources::ExportTree;

use crate::redact::redact_text_files;
use crate::{Stage, StageOptions};

/// Blanks identifying header fields and sweeps every text file for addresses
pub struct HeaderStage {
    redactor: HeaderRedactor,
}

impl HeaderStage {
    pub fn new(marker: RedactionMarker) -> Result<Self> {
        Ok(Self {
            redactor: HeaderRedactor::new(marker)?,
        })
    }
}

impl Stage for HeaderStage {
    fn kind(&self) -> StageKind {
        StageKind::Headers
    }

    fn execute(&self, tree: &ExportTree, options: &StageOptions) -> Result<StageReport> {
        redact_text_files(tree, StageKind::Headers, options, |content| {
            self.redactor.redact(content)
        })
    }
}
