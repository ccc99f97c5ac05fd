use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Partition '{0}' contains no snapshots")]
    EmptyPartition(String),

    #[error("No snapshot in partition '{0}' could be read")]
    NoReadableSnapshots(String),

    #[error("Cache artifact '{0}' does not describe a valid tensor")]
    InvalidArtifact(PathBuf),
}
