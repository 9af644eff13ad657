//! Checksum gate for the mvr repository.
//!
//! Clients finish a deploy by uploading checksums of the candidate
//! `maven-metadata.xml`. The gate matches each checksum to a staged
//! candidate, decides when a staged version has enough integrity proofs to
//! be committed, and runs a pipeline of validation stages over it.
//!
//! ```text
//! Incomplete --checksum, not ready--> Incomplete
//! Incomplete --ready--> ReadyToValidate --valid--> Committed
//!                       ReadyToValidate --invalid--> Incomplete
//! ```

pub mod error;
pub mod gate;
pub mod record;
pub mod stage;
pub mod stages;
pub mod upload;

pub use error::{GateError, GateResult};
pub use gate::{ChecksumGate, Decision, GateVerdict};
pub use record::{ChecksumRecord, UploadReadiness};
pub use stage::{GateContext, GateStage, StageDecision, StageResult};
pub use stages::{ChecksumStage, CoordinateStage, VersionStage};
pub use upload::StagedUpload;
