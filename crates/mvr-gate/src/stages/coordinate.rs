use mvr_metadata::DeployMetadata;

use crate::error::GateError;
use crate::stage::{GateContext, GateStage, StageDecision};
use crate::upload::StagedUpload;

/// The candidate metadata must name the package the request addressed.
pub struct CoordinateStage;

impl GateStage for CoordinateStage {
    fn name(&self) -> &str {
        "coordinate"
    }

    fn evaluate(
        &self,
        upload: &StagedUpload,
        context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        let Some(candidate) = upload.candidate() else {
            return Ok(StageDecision::fail("no candidate metadata staged"));
        };
        let candidate = match DeployMetadata::parse(candidate) {
            Ok(c) => c,
            Err(e) => return Ok(StageDecision::fail(e.to_string())),
        };
        let expected = &context.package;
        if candidate.group_id() != Some(expected.group_id()) {
            return Ok(StageDecision::fail(format!(
                "groupId {:?} does not match {}",
                candidate.group_id().unwrap_or_default(),
                expected.group_id()
            )));
        }
        if candidate.artifact_id() != Some(expected.artifact_id()) {
            return Ok(StageDecision::fail(format!(
                "artifactId {:?} does not match {}",
                candidate.artifact_id().unwrap_or_default(),
                expected.artifact_id()
            )));
        }
        Ok(StageDecision::Pass)
    }
}
