pub mod checksum;
pub mod coordinate;
pub mod version;

pub use checksum::ChecksumStage;
pub use coordinate::CoordinateStage;
pub use version::VersionStage;
