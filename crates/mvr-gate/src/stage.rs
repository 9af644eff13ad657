use std::time::Duration;

use mvr_types::MetadataCoordinate;

use crate::error::GateError;
use crate::upload::StagedUpload;

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The stage failed; the upload stays staged and may be retried.
    Fail { reason: String },
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub(crate) fn fail(reason: impl Into<String>) -> Self {
        Self::Fail {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    /// Populated on failure.
    pub reason: Option<String>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// Contextual information available to every gate stage.
pub struct GateContext {
    /// The package the upload request addressed.
    pub package: MetadataCoordinate,
}

impl GateContext {
    pub fn new(package: MetadataCoordinate) -> Self {
        Self { package }
    }
}

// ---------------------------------------------------------------------------
// GateStage trait
// ---------------------------------------------------------------------------

/// A single evaluation stage in the validation pipeline.
///
/// Stages are evaluated in order over the same [`StagedUpload`] snapshot.
/// The trait is object-safe so stages can be stored in a
/// `Vec<Box<dyn GateStage>>`.
pub trait GateStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "checksum", "version").
    fn name(&self) -> &str;

    fn evaluate(
        &self,
        upload: &StagedUpload,
        context: &GateContext,
    ) -> Result<StageDecision, GateError>;
}
