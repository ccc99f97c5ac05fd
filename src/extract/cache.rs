use crate::extract::error::ExtractError;
use crate::extract::RawSeries;
use crate::snapshot::BINCODE_CONFIG;
use chrono::NaiveDateTime;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Persists extracted raw tensors so re-runs skip snapshot re-reads.
///
/// The artifact filename carries the partition key plus a fingerprint of the
/// ordered point-id list and the partition's first/last snapshot timestamps,
/// and the artifact itself embeds the id list, which is re-verified on load.
/// Changing the point set or the date range covered by a partition (a run
/// with narrower date bounds sees a shorter span) therefore invalidates the
/// cache instead of silently reusing a mismatched or truncated tensor. Any
/// unreadable or mismatched artifact is treated as a miss.
pub struct CacheStore {
    dir: PathBuf,
}

/// On-disk mirror of [`RawSeries`]: gzip-compressed bincode. The tensor is
/// flattened in `[point][time][var]` order next to its shape.
#[derive(Debug, Serialize, Deserialize)]
struct CacheArtifact {
    partition: String,
    point_ids: Vec<String>,
    variables: Vec<String>,
    times: Vec<NaiveDateTime>,
    shape: (usize, usize, usize),
    data: Vec<f64>,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Filename for one `(partition, point set, snapshot span)` cache key.
    pub fn artifact_path(
        &self,
        partition: &str,
        point_ids: &[String],
        span: (NaiveDateTime, NaiveDateTime),
    ) -> PathBuf {
        let fp = fingerprint(partition, point_ids, span);
        self.dir
            .join(format!("{partition}-{fp:016x}.series.bin.gz"))
    }

    /// Returns the cached tensor for the key when one exists and `force` is
    /// unset; otherwise invokes `compute` and persists its result.
    ///
    /// Persisting is best-effort: a failed write is logged and the freshly
    /// computed tensor is still returned.
    pub fn load_or_compute<F>(
        &self,
        partition: &str,
        point_ids: &[String],
        span: (NaiveDateTime, NaiveDateTime),
        force: bool,
        compute: F,
    ) -> Result<RawSeries, ExtractError>
    where
        F: FnOnce() -> Result<RawSeries, ExtractError>,
    {
        let path = self.artifact_path(partition, point_ids, span);

        if !force && path.exists() {
            match load_artifact(&path) {
                Ok(raw) if raw.point_ids == point_ids => {
                    info!(
                        "Cache hit for partition {} at '{}'",
                        partition,
                        path.display()
                    );
                    return Ok(raw);
                }
                Ok(_) => warn!(
                    "Cache artifact '{}' was built for a different point set, recomputing",
                    path.display()
                ),
                Err(e) => warn!(
                    "Cache artifact '{}' unreadable ({}), recomputing",
                    path.display(),
                    e
                ),
            }
        }

        let raw = compute()?;
        if let Err(e) = self.persist(&raw, &path) {
            warn!(
                "Failed to persist cache artifact '{}': {}",
                path.display(),
                e
            );
        }
        Ok(raw)
    }

    fn persist(&self, raw: &RawSeries, path: &Path) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.dir)?;
        let artifact = CacheArtifact {
            partition: raw.partition.clone(),
            point_ids: raw.point_ids.clone(),
            variables: raw.variables.clone(),
            times: raw.times.clone(),
            shape: raw.data.dim(),
            data: raw.data.iter().copied().collect(),
        };
        let bytes = bincode::serde::encode_to_vec(&artifact, BINCODE_CONFIG)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&bytes)?;
        encoder.finish()?;
        info!(
            "Cached partition {} tensor at '{}'",
            raw.partition,
            path.display()
        );
        Ok(())
    }
}

fn load_artifact(path: &Path) -> Result<RawSeries, ExtractError> {
    let read = || -> Result<Vec<u8>, std::io::Error> {
        let file = File::open(path)?;
        let mut decoder = GzDecoder::new(file);
        let mut bytes = Vec::new();
        decoder.read_to_end(&mut bytes)?;
        Ok(bytes)
    };
    let bytes = read().map_err(|_| ExtractError::InvalidArtifact(path.to_path_buf()))?;
    let (artifact, _) =
        bincode::serde::decode_from_slice::<CacheArtifact, _>(&bytes, BINCODE_CONFIG)
            .map_err(|_| ExtractError::InvalidArtifact(path.to_path_buf()))?;

    let data = ndarray::Array3::from_shape_vec(artifact.shape, artifact.data)
        .map_err(|_| ExtractError::InvalidArtifact(path.to_path_buf()))?;
    Ok(RawSeries {
        partition: artifact.partition,
        point_ids: artifact.point_ids,
        variables: artifact.variables,
        times: artifact.times,
        data,
    })
}

fn fingerprint(
    partition: &str,
    point_ids: &[String],
    span: (NaiveDateTime, NaiveDateTime),
) -> u64 {
    let mut hasher = DefaultHasher::new();
    partition.hash(&mut hasher);
    point_ids.hash(&mut hasher);
    span.hash(&mut hasher);
    hasher.finish()
}
