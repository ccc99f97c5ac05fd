pub mod error;
mod manifest;
mod series;

pub use manifest::{write_locations, write_manifest};
pub use series::{read_series_header, write_series, SeriesHeader};
