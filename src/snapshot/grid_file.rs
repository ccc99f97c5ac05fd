use crate::snapshot::error::SnapshotError;
use crate::snapshot::BINCODE_CONFIG;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// One gridded snapshot in memory: a fixed lat/lon axis pair plus named 2-D
/// fields stored row-major as `[lat][lon]`.
///
/// The on-disk form is the bincode encoding of this struct, gzip-compressed.
/// The pipeline only ever reads snapshots; the writer exists for tooling and
/// test fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    lat_axis: Vec<f64>,
    lon_axis: Vec<f64>,
    fields: Vec<GridField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GridField {
    name: String,
    values: Vec<f64>,
}

impl GridData {
    pub fn new(lat_axis: Vec<f64>, lon_axis: Vec<f64>) -> Self {
        Self {
            lat_axis,
            lon_axis,
            fields: Vec::new(),
        }
    }

    pub fn lat_axis(&self) -> &[f64] {
        &self.lat_axis
    }

    pub fn lon_axis(&self) -> &[f64] {
        &self.lon_axis
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Adds a named field; `values` must be `[lat][lon]` row-major.
    pub fn insert_field(&mut self, name: &str, values: Vec<f64>) -> Result<(), SnapshotError> {
        let expected = self.lat_axis.len() * self.lon_axis.len();
        if values.len() != expected {
            return Err(SnapshotError::FieldShape {
                field: name.to_string(),
                found: values.len(),
                expected,
                nlat: self.lat_axis.len(),
                nlon: self.lon_axis.len(),
            });
        }
        self.fields.push(GridField {
            name: name.to_string(),
            values,
        });
        Ok(())
    }

    /// Scalar lookup at one grid cell.
    pub fn value(
        &self,
        name: &str,
        lat_index: usize,
        lon_index: usize,
    ) -> Result<f64, SnapshotError> {
        let nlat = self.lat_axis.len();
        let nlon = self.lon_axis.len();
        if lat_index >= nlat || lon_index >= nlon {
            return Err(SnapshotError::IndexOutOfBounds {
                lat_index,
                lon_index,
                nlat,
                nlon,
            });
        }
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| SnapshotError::FieldMissing(name.to_string()))?;
        Ok(field.values[lat_index * nlon + lon_index])
    }

    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path).map_err(|e| SnapshotError::FileRead(path.to_path_buf(), e))?;
        let mut decoder = GzDecoder::new(file);
        let mut bytes = Vec::new();
        decoder
            .read_to_end(&mut bytes)
            .map_err(|e| SnapshotError::FileRead(path.to_path_buf(), e))?;
        let (grid, _) = bincode::serde::decode_from_slice::<GridData, _>(&bytes, BINCODE_CONFIG)
            .map_err(|e| SnapshotError::FileDecode(path.to_path_buf(), Box::new(e)))?;
        Ok(grid)
    }

    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let bytes = bincode::serde::encode_to_vec(self, BINCODE_CONFIG)
            .map_err(|e| SnapshotError::Encode(Box::new(e)))?;
        let file =
            File::create(path).map_err(|e| SnapshotError::FileWrite(path.to_path_buf(), e))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(&bytes)
            .map_err(|e| SnapshotError::FileWrite(path.to_path_buf(), e))?;
        encoder
            .finish()
            .map_err(|e| SnapshotError::FileWrite(path.to_path_buf(), e))?;
        Ok(())
    }
}
