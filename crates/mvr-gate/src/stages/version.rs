use mvr_types::Version;

use crate::error::GateError;
use crate::stage::{GateContext, GateStage, StageDecision};
use crate::upload::StagedUpload;

/// The staged version subkey must be a well-formed version.
pub struct VersionStage;

impl GateStage for VersionStage {
    fn name(&self) -> &str {
        "version"
    }

    fn evaluate(
        &self,
        upload: &StagedUpload,
        _context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        let version = upload.location.version();
        if Version::is_valid(version) {
            Ok(StageDecision::Pass)
        } else {
            Ok(StageDecision::fail(format!("invalid version {version:?}")))
        }
    }
}
