use crate::catalog::error::CatalogError;
use crate::extract::error::ExtractError;
use crate::output::error::OutputError;
use crate::points::error::PointError;
use crate::snapshot::error::SnapshotError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteogridError {
    #[error(transparent)]
    Point(#[from] PointError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("No query points supplied")]
    NoQueryPoints,

    #[error("No snapshots found under the configured source roots")]
    NoSnapshotsFound,

    #[error("No snapshot could be opened to read the coordinate axes")]
    NoReadableSnapshots,

    #[error("Extraction failed for every partition")]
    AllPartitionsFailed,

    #[error("No series file was produced")]
    NoSeriesProduced,

    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),
}
