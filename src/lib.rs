//! Grid-to-point extraction of meteorological forcing series.
//!
//! Given a set of query coordinates and a directory of timestamped gridded
//! snapshots, the pipeline resolves each coordinate to its nearest grid
//! cell, accumulates a multi-variable raw series per cell (cached per
//! partition), converts it into the target unit system, and writes one
//! tabular forcing file per point plus the index manifest the downstream
//! hydrological model reads.

mod catalog;
mod convert;
mod error;
mod extract;
mod output;
mod pipeline;
mod points;
mod snapshot;
mod utils;

pub use error::MeteogridError;
pub use pipeline::{ForcingPipeline, RunSummary};

pub use catalog::{timestamp_from_name, PartitionScheme, SnapshotCatalog, SnapshotFile};
pub use convert::{
    convert, default_variables, relative_humidity, ColumnSpec, ConvertedSeries, ForcingVariable,
    OutputSchema,
};
pub use extract::{extract, CacheStore, RawSeries};
pub use output::{read_series_header, write_locations, write_manifest, write_series, SeriesHeader};
pub use points::{
    ensure_unique_ids, parse_point_list, read_point_file, resolve, QueryPoint, ResolvedPoint,
};
pub use snapshot::GridData;

pub use catalog::error::CatalogError;
pub use extract::error::ExtractError;
pub use output::error::OutputError;
pub use points::error::PointError;
pub use snapshot::error::SnapshotError;
