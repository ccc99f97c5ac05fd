//! The batch pipeline tying the stages together: catalog discovery,
//! coordinate resolution, cached extraction, unit conversion, and output
//! serialization. Errors local to one partition or point are logged and
//! contained; only total absence of usable input or output is fatal.

use crate::catalog::{PartitionScheme, SnapshotCatalog};
use crate::convert::{convert, default_variables, ConvertedSeries, OutputSchema};
use crate::error::MeteogridError;
use crate::extract::{extract, CacheStore};
use crate::output::{write_locations, write_manifest, write_series};
use crate::points::{ensure_unique_ids, resolve, QueryPoint, ResolvedPoint};
use crate::snapshot::GridData;
use bon::bon;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;

const SERIES_DIR_NAME: &str = "csv";
const CACHE_DIR_NAME: &str = "cache";

/// What a completed run produced, for callers that report or assert on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub snapshots_found: usize,
    pub partitions_extracted: usize,
    pub partitions_skipped: usize,
    pub series_written: usize,
    pub manifest_path: PathBuf,
    pub locations_path: PathBuf,
}

/// Immutable configuration for one extraction run.
///
/// Built once via the builder, then [`run`](ForcingPipeline::run) any number
/// of times; re-runs are idempotent thanks to the cache store and the
/// skip-existing series writer unless `force` is set.
#[derive(Debug, Clone)]
pub struct ForcingPipeline {
    source_roots: Vec<PathBuf>,
    output_dir: PathBuf,
    cache_dir: PathBuf,
    points: Vec<QueryPoint>,
    variables: Vec<String>,
    schema: OutputSchema,
    scheme: PartitionScheme,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    force: bool,
}

#[bon]
impl ForcingPipeline {
    /// Assembles a pipeline configuration.
    ///
    /// Defaults: cache under `<output_dir>/cache`, the GLDAS-Noah variable
    /// set, the canonical output schema, calendar-year partitioning, no date
    /// bounds, `force` off.
    #[builder]
    pub fn new(
        source_roots: Vec<PathBuf>,
        output_dir: PathBuf,
        cache_dir: Option<PathBuf>,
        points: Vec<QueryPoint>,
        variables: Option<Vec<String>>,
        schema: Option<OutputSchema>,
        scheme: Option<PartitionScheme>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        force: Option<bool>,
    ) -> Self {
        let cache_dir = cache_dir.unwrap_or_else(|| output_dir.join(CACHE_DIR_NAME));
        Self {
            source_roots,
            output_dir,
            cache_dir,
            points,
            variables: variables.unwrap_or_else(default_variables),
            schema: schema.unwrap_or_default(),
            scheme: scheme.unwrap_or(PartitionScheme::CalendarYear),
            start_date,
            end_date,
            force: force.unwrap_or(false),
        }
    }

    /// Runs the full pipeline and reports what was produced.
    pub fn run(&self) -> Result<RunSummary, MeteogridError> {
        if self.points.is_empty() {
            return Err(MeteogridError::NoQueryPoints);
        }
        ensure_unique_ids(&self.points)?;

        let catalog = SnapshotCatalog::discover(&self.source_roots)?
            .filter_range(self.start_date, self.end_date);
        if catalog.is_empty() {
            return Err(MeteogridError::NoSnapshotsFound);
        }
        let snapshots_found = catalog.len();

        let resolved = self.resolve_against_axes(&catalog)?;
        let point_ids: Vec<String> = resolved.iter().map(|p| p.query.id.clone()).collect();

        let series_dir = self.output_dir.join(SERIES_DIR_NAME);
        std::fs::create_dir_all(&series_dir)
            .map_err(|e| MeteogridError::OutputDirCreation(series_dir.clone(), e))?;

        // Extraction, cached per (partition, point set).
        let cache = CacheStore::new(&self.cache_dir);
        let partitions = catalog.partition(self.scheme);
        let mut partitions_skipped = 0;
        let mut raw_series = Vec::new();
        for (key, snapshots) in &partitions {
            // Partitions are built non-empty; the span keys the cache to the
            // exact snapshot range so changed date bounds recompute.
            let Some(span) = snapshots
                .first()
                .zip(snapshots.last())
                .map(|(first, last)| (first.timestamp, last.timestamp))
            else {
                continue;
            };
            let result = cache.load_or_compute(key, &point_ids, span, self.force, || {
                extract(key, snapshots, &resolved, &self.variables)
            });
            match result {
                Ok(raw) => raw_series.push(raw),
                Err(e) => {
                    warn!("Skipping partition {}: {}", key, e);
                    partitions_skipped += 1;
                }
            }
        }
        if raw_series.is_empty() {
            return Err(MeteogridError::AllPartitionsFailed);
        }
        let partitions_extracted = raw_series.len();

        // Conversion, then per-point chronological concatenation across
        // partitions (partition keys iterate ascending).
        let mut merged: HashMap<String, ConvertedSeries> = HashMap::new();
        for raw in &raw_series {
            for series in convert(raw, &self.schema) {
                match merged.get_mut(&series.point_id) {
                    Some(existing) => existing.append(series),
                    None => {
                        merged.insert(series.point_id.clone(), series);
                    }
                }
            }
        }

        let mut series_written = 0;
        for point in &resolved {
            let Some(series) = merged.get(&point.query.id) else {
                continue;
            };
            match write_series(series, &series_dir, self.force) {
                Ok(_) => series_written += 1,
                Err(e) => error!("Series for point {} not written: {}", point.query.id, e),
            }
        }
        if series_written == 0 {
            return Err(MeteogridError::NoSeriesProduced);
        }

        let manifest_path = write_manifest(&resolved, &series_dir, &self.output_dir)?;
        let locations_path = write_locations(&resolved, &self.output_dir)?;

        let summary = RunSummary {
            snapshots_found,
            partitions_extracted,
            partitions_skipped,
            series_written,
            manifest_path,
            locations_path,
        };
        info!(
            "Run complete: {} snapshot(s), {} partition(s) extracted ({} skipped), {} series file(s)",
            summary.snapshots_found,
            summary.partitions_extracted,
            summary.partitions_skipped,
            summary.series_written
        );
        Ok(summary)
    }

    /// Resolves the query points against the axes of the first readable
    /// snapshot; unreadable leading snapshots are skipped with a warning.
    fn resolve_against_axes(
        &self,
        catalog: &SnapshotCatalog,
    ) -> Result<Vec<ResolvedPoint>, MeteogridError> {
        for snapshot in catalog.snapshots() {
            match GridData::read(&snapshot.path) {
                Ok(grid) => {
                    let resolved = resolve(&self.points, grid.lat_axis(), grid.lon_axis())?;
                    return Ok(resolved);
                }
                Err(e) => warn!(
                    "Cannot take axes from '{}': {}",
                    snapshot.path.display(),
                    e
                ),
            }
        }
        Err(MeteogridError::NoReadableSnapshots)
    }
}
