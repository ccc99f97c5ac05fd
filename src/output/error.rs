use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Series for point '{0}' has no timesteps, nothing to write")]
    EmptySeries(String),

    #[error("Failed to write series file '{0}'")]
    SeriesWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to read series file '{0}'")]
    SeriesRead(PathBuf, #[source] std::io::Error),

    #[error("Malformed series header in '{path}': {reason}")]
    HeaderParse { path: PathBuf, reason: String },

    #[error("Series file(s) missing for point(s) {0:?}, manifest not written")]
    MissingSeries(Vec<String>),

    #[error("Failed to write manifest '{0}'")]
    ManifestWrite(PathBuf, #[source] std::io::Error),
}
