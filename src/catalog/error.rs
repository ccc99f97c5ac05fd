use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to list snapshot directory '{0}'")]
    SourceDirRead(PathBuf, #[source] std::io::Error),
}
