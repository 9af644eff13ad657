use crate::error::GateError;
use crate::stage::{GateContext, GateStage, StageDecision};
use crate::upload::StagedUpload;

/// Recomputes every staged checksum against the content it covers.
pub struct ChecksumStage;

impl GateStage for ChecksumStage {
    fn name(&self) -> &str {
        "checksum"
    }

    fn evaluate(
        &self,
        upload: &StagedUpload,
        _context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        for record in upload.records() {
            let content = upload
                .files
                .get(&record.content)
                .ok_or_else(|| GateError::stage(self.name(), format!("{} vanished", record.content)))?;
            if !record.verify(content) {
                return Ok(StageDecision::fail(format!(
                    "{} checksum of {} does not match its content",
                    record.algorithm, record.content
                )));
            }
        }
        Ok(StageDecision::Pass)
    }
}
