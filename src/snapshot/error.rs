use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode snapshot file '{0}'")]
    FileDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode snapshot data")]
    Encode(#[source] Box<bincode::error::EncodeError>),

    #[error("Failed to write snapshot file '{0}'")]
    FileWrite(PathBuf, #[source] std::io::Error),

    #[error("Field '{field}' has {found} values, expected {expected} for a {nlat}x{nlon} grid")]
    FieldShape {
        field: String,
        found: usize,
        expected: usize,
        nlat: usize,
        nlon: usize,
    },

    #[error("Field '{0}' not present in snapshot")]
    FieldMissing(String),

    #[error("Grid index [lat {lat_index}, lon {lon_index}] out of bounds for a {nlat}x{nlon} grid")]
    IndexOutOfBounds {
        lat_index: usize,
        lon_index: usize,
        nlat: usize,
        nlon: usize,
    },
}
