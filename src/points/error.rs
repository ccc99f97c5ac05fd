use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PointError {
    #[error("Failed to read point file '{0}'")]
    PointFileRead(PathBuf, #[source] std::io::Error),

    #[error("No valid coordinate pair found in '{0}'")]
    EmptyPointFile(PathBuf),

    #[error("Duplicate point id '{0}' in query set")]
    DuplicatePointId(String),

    #[error("Coordinate axis '{0}' is empty")]
    EmptyAxis(&'static str),
}
